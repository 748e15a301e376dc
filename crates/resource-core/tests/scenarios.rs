// This file is part of resourced.

// resourced is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// resourced is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with resourced.  If not, see <http://www.gnu.org/licenses/>.

//! End-to-end scenarios against an in-memory store and a fixed oracle.

use std::sync::Arc;

use ethereum_types::Address;
use resource_core::error::{Error, Result};
use resource_core::testing::{FixedOracle, InMemoryStore};
use resource_core::{Handler, HandlerConfig, Key, Signature65, Validator};

const FREQUENCY: u64 = 10;

fn handler(store: InMemoryStore, oracle: FixedOracle) -> Handler<InMemoryStore, FixedOracle> {
    Handler::new(store, oracle, None, HandlerConfig::default())
}

#[test]
fn new_resource_registers_and_is_synced() {
    let h = handler(InMemoryStore::new(), FixedOracle::new(100));
    let name_hash = h.new_resource("foo.bar", FREQUENCY).unwrap();
    assert_eq!(name_hash, keccak_hash::keccak(b"foo.bar"));
    assert_eq!(h.get_block().unwrap(), 100);
    assert_eq!(h.block_to_period("foo.bar", 100).unwrap(), 1);
}

#[test]
fn update_then_lookup_latest_round_trips() {
    let h = handler(InMemoryStore::new(), FixedOracle::new(100));
    h.new_resource("foo.bar", FREQUENCY).unwrap();
    h.update("foo.bar", b"hello").unwrap();

    assert_eq!(h.get_content("foo.bar").unwrap(), b"hello");
    assert_eq!(h.get_version("foo.bar").unwrap(), 1);
    assert_eq!(h.get_last_period("foo.bar").unwrap(), 1);
    assert_eq!(h.lookup_latest("foo.bar", false).unwrap(), b"hello");
}

#[test]
fn version_bump_within_same_period() {
    let h = handler(InMemoryStore::new(), FixedOracle::new(100));
    h.new_resource("foo.bar", FREQUENCY).unwrap();
    h.update("foo.bar", b"v1").unwrap();
    h.update("foo.bar", b"v2").unwrap();

    assert_eq!(h.get_version("foo.bar").unwrap(), 2);
    assert_eq!(h.get_content("foo.bar").unwrap(), b"v2");
    // Version 1 is still independently retrievable within the same period.
    assert_eq!(h.lookup_version("foo.bar", 1, 1, true).unwrap(), b"v1");
}

#[test]
fn historical_walk_across_periods() {
    let oracle = FixedOracle::new(0);
    let store = InMemoryStore::new();
    let h = Handler::new(store, oracle.clone(), None, HandlerConfig::default());

    h.new_resource("foo.bar", FREQUENCY).unwrap();
    h.update("foo.bar", b"period-1").unwrap();

    // Advance past two whole periods without ever publishing into them.
    oracle.set(25);
    h.update("foo.bar", b"period-3").unwrap();

    // A historical lookup targeting period 2 (empty) walks down to period 1.
    assert_eq!(h.lookup_historical("foo.bar", 2, true).unwrap(), b"period-1");
    // Lookup latest finds the period-3 update directly.
    assert_eq!(h.lookup_latest("foo.bar", true).unwrap(), b"period-3");
}

#[test]
fn bad_name_is_rejected() {
    let h = handler(InMemoryStore::new(), FixedOracle::new(0));
    let err = h.new_resource("Foo.Bar", FREQUENCY).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn validator_rejects_unauthorized_signer() {
    let authorized = Address::from_low_u64_be(1);
    let validator: Arc<dyn Validator> = Arc::new(FakeValidator {
        signer: Address::from_low_u64_be(2),
        authorized,
    });
    let h = Handler::new(
        InMemoryStore::new(),
        FixedOracle::new(0),
        Some(validator),
        HandlerConfig::default(),
    );

    let err = h.new_resource("foo.bar", FREQUENCY).unwrap_err();
    assert!(matches!(err, Error::AuthorizationFailed));
}

#[test]
fn validator_allows_authorized_signer_round_trip() {
    let authorized = Address::from_low_u64_be(7);
    let validator: Arc<dyn Validator> = Arc::new(FakeValidator {
        signer: authorized,
        authorized,
    });
    let h = Handler::new(
        InMemoryStore::new(),
        FixedOracle::new(0),
        Some(validator),
        HandlerConfig::default(),
    );

    h.new_resource("foo.bar", FREQUENCY).unwrap();
    h.update("foo.bar", b"signed").unwrap();
    assert_eq!(h.get_content("foo.bar").unwrap(), b"signed");
}

/// A non-cryptographic `Validator` double: `sign` stuffs the configured
/// signer's address into the signature bytes, `recover` reads it back.
struct FakeValidator {
    signer: Address,
    authorized: Address,
}

impl Validator for FakeValidator {
    fn name_hash(&self, name: &str) -> Key {
        keccak_hash::keccak(name.as_bytes())
    }

    fn sign(&self, _digest: Key) -> Result<Signature65> {
        let mut sig = [0u8; 65];
        sig[0..20].copy_from_slice(self.signer.as_bytes());
        Ok(sig)
    }

    fn recover(&self, _digest: Key, signature: &Signature65) -> Result<Address> {
        Ok(Address::from_slice(&signature[0..20]))
    }

    fn check_access(&self, _name: &str, recovered: Address) -> bool {
        recovered == self.authorized
    }
}
