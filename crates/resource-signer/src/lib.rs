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

//! A `resource_core::Validator` backed by secp256k1 sign/recover, the same
//! primitives `crates/accounts/ethstore/src/account/safe_account.rs` and
//! `crates/rpc/src/v1/helpers/engine_signer.rs` wrap around account-managed
//! keys. Here the key is held directly rather than behind an account store,
//! since this crate has no keystore of its own to defer to.

use std::collections::HashSet;

use crypto::publickey::{self, KeyPair};
use ethereum_types::{Address, H520};
use resource_core::error::{Error, Result};
use resource_core::{Key, Signature65, Validator};

/// Re-exported so callers can construct a secret without depending on
/// `parity-crypto` directly.
pub use crypto::publickey::Secret;

/// Signs and recovers with a single secp256k1 keypair, and authorizes either
/// any signer (an empty allow-list) or only the addresses in `authorized`.
pub struct KeyPairValidator {
    keypair: KeyPair,
    authorized: HashSet<Address>,
}

impl KeyPairValidator {
    /// Builds a validator from a raw 32-byte secret. Every address is
    /// authorized to publish.
    pub fn new(secret: Secret) -> Result<Self> {
        let keypair =
            KeyPair::from_secret(secret).map_err(|e| Error::CryptoError(e.to_string()))?;
        Ok(KeyPairValidator {
            keypair,
            authorized: HashSet::new(),
        })
    }

    /// Restricts publication to exactly the given set of addresses.
    pub fn with_authorized(mut self, authorized: impl IntoIterator<Item = Address>) -> Self {
        self.authorized = authorized.into_iter().collect();
        self
    }

    /// The address this validator signs as.
    pub fn address(&self) -> Address {
        publickey::public_to_address(self.keypair.public())
    }
}

impl Validator for KeyPairValidator {
    fn name_hash(&self, name: &str) -> Key {
        keccak_hash::keccak(name.as_bytes())
    }

    fn sign(&self, digest: Key) -> Result<Signature65> {
        let signature =
            publickey::sign(self.keypair.secret(), &digest).map_err(|e| Error::CryptoError(e.to_string()))?;
        let mut out = [0u8; 65];
        out.copy_from_slice(H520::from(signature).as_bytes());
        Ok(out)
    }

    fn recover(&self, digest: Key, signature: &Signature65) -> Result<Address> {
        let sig: publickey::Signature = H520::from_slice(signature).into();
        let public =
            publickey::recover(&sig, &digest).map_err(|e| Error::CryptoError(e.to_string()))?;
        Ok(publickey::public_to_address(&public))
    }

    fn check_access(&self, _name: &str, recovered: Address) -> bool {
        self.authorized.is_empty() || self.authorized.contains(&recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret {
        Secret::import_key(&Key::from_low_u64_be(0xdead_beef).0).unwrap()
    }

    #[test]
    fn sign_then_recover_yields_own_address() {
        let validator = KeyPairValidator::new(secret()).unwrap();
        let digest = keccak_hash::keccak(b"some update payload");
        let sig = validator.sign(digest).unwrap();
        let recovered = validator.recover(digest, &sig).unwrap();
        assert_eq!(recovered, validator.address());
    }

    #[test]
    fn check_access_defaults_to_open() {
        let validator = KeyPairValidator::new(secret()).unwrap();
        assert!(validator.check_access("foo.bar", Address::zero()));
    }

    #[test]
    fn check_access_restricts_to_allow_list() {
        let validator = KeyPairValidator::new(secret()).unwrap().with_authorized([Address::from_low_u64_be(1)]);
        assert!(!validator.check_access("foo.bar", Address::from_low_u64_be(2)));
        assert!(validator.check_access("foo.bar", Address::from_low_u64_be(1)));
    }
}
