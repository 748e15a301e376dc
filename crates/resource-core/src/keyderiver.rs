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

//! Key derivation (§4.2).
//!
//! Each method here builds a fresh `tiny-keccak`-backed hasher per call
//! (via `keccak_hash::keccak`) rather than sharing one behind a mutex — see
//! the Open Question decision in DESIGN.md. The hash is short-lived and the
//! state small enough that pooling would only add contention.

use crate::validator::Validator;
use crate::Key;

/// Computes the three hashes the protocol needs: the root-chunk key
/// (namehash), the update-chunk key, and the signing digest for an update.
#[derive(Clone, Default)]
pub struct KeyDeriver;

impl KeyDeriver {
    /// Returns a new, stateless key deriver.
    pub fn new() -> Self {
        KeyDeriver
    }

    /// `namehash(name)`: delegates to the validator when one is configured,
    /// otherwise Keccak-256 of the raw name bytes.
    pub fn name_hash(&self, name: &str, validator: Option<&dyn Validator>) -> Key {
        match validator {
            Some(v) => v.name_hash(name),
            None => keccak_hash::keccak(name.as_bytes()),
        }
    }

    /// `resource_hash(period, version, name_hash) = Keccak(period_le32 ‖
    /// version_le32 ‖ name_hash)`.
    pub fn resource_hash(&self, period: u32, version: u32, name_hash: Key) -> Key {
        let mut buf = [0u8; 4 + 4 + 32];
        buf[0..4].copy_from_slice(&period.to_le_bytes());
        buf[4..8].copy_from_slice(&version.to_le_bytes());
        buf[8..40].copy_from_slice(name_hash.as_bytes());
        keccak_hash::keccak(&buf[..])
    }

    /// `key_data_hash(key, data) = Keccak(key ‖ data)`: the digest an update
    /// is signed over.
    pub fn key_data_hash(&self, key: Key, data: &[u8]) -> Key {
        let mut buf = Vec::with_capacity(32 + data.len());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(data);
        keccak_hash::keccak(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_hash_matches_manual_concatenation() {
        let kd = KeyDeriver::new();
        let name_hash = keccak_hash::keccak(b"foo.bar");
        let got = kd.resource_hash(2, 1, name_hash);

        let mut expected_input = Vec::new();
        expected_input.extend_from_slice(&2u32.to_le_bytes());
        expected_input.extend_from_slice(&1u32.to_le_bytes());
        expected_input.extend_from_slice(name_hash.as_bytes());
        let expected = keccak_hash::keccak(&expected_input);

        assert_eq!(got, expected);
    }

    #[test]
    fn name_hash_without_validator_is_raw_keccak() {
        let kd = KeyDeriver::new();
        assert_eq!(kd.name_hash("foo.bar", None), keccak_hash::keccak(b"foo.bar"));
    }

    #[test]
    fn key_data_hash_is_deterministic() {
        let kd = KeyDeriver::new();
        let key = keccak_hash::keccak(b"key");
        assert_eq!(kd.key_data_hash(key, b"data"), kd.key_data_hash(key, b"data"));
        assert_ne!(kd.key_data_hash(key, b"data"), kd.key_data_hash(key, b"other"));
    }
}
