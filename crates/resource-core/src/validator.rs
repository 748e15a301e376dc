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

//! The optional Validator hook (§4.3): signing, signer recovery, access
//! control, and an alternate namehash. A concrete implementation
//! (`resource-signer`) backs this with secp256k1 sign/recover; this crate
//! only defines the trait boundary so the protocol core never depends on a
//! specific crypto crate.

use crate::error::Result;
use crate::{Key, Signature65};
use ethereum_types::Address;

/// Optional signing, recovery and access-control hook.
pub trait Validator: Send + Sync {
    /// Size in bytes of the configured hash function (for external
    /// reporting; always 32 for Keccak-256 in this implementation).
    fn hash_size(&self) -> usize {
        32
    }

    /// Canonical namehash for `name` (e.g. a domain-namehash), used in place
    /// of raw Keccak when a validator is configured.
    fn name_hash(&self, name: &str) -> Key;

    /// Produces a recoverable signature over a 32-byte digest.
    fn sign(&self, digest: Key) -> Result<Signature65>;

    /// Recovers the signer's address from a digest and signature.
    fn recover(&self, digest: Key, signature: &Signature65) -> Result<Address>;

    /// Authorization predicate: may `recovered` publish updates to `name`?
    fn check_access(&self, name: &str, recovered: Address) -> bool;
}
