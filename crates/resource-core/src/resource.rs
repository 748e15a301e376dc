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

//! The per-name cache entry (§3) and its sync invariant.

use crate::Key;
use std::time::SystemTime;

/// In-memory cache entry for one named resource.
#[derive(Debug, Clone)]
pub struct Resource {
    /// The resource's own name.
    pub name: String,
    /// `name_hash(name)` — the root chunk's key.
    pub name_hash: Key,
    /// Block height at which the resource was registered.
    pub start_block: u64,
    /// Block count per period; always ≥ 1 for a valid resource.
    pub frequency: u64,
    /// Period of the last observed update, 0 if none yet.
    pub last_period: u32,
    /// Version of the last observed update, 0 if none yet.
    pub version: u32,
    /// Key of the last observed update chunk, if any.
    pub last_key: Option<Key>,
    /// Payload bytes of the last observed update.
    pub data: Vec<u8>,
    /// Timestamp of the last successful sync; `None` means never synced.
    pub updated: Option<SystemTime>,
}

impl Resource {
    /// Builds a freshly-registered, already-synced resource (as produced by
    /// `NewResource`).
    pub fn new_registered(name: String, name_hash: Key, start_block: u64, frequency: u64) -> Self {
        Resource {
            name,
            name_hash,
            start_block,
            frequency,
            last_period: 0,
            version: 0,
            last_key: None,
            data: Vec::new(),
            updated: Some(SystemTime::now()),
        }
    }

    /// True iff this entry has observed at least one valid root or update
    /// chunk since the process started or was last refreshed.
    pub fn is_synced(&self) -> bool {
        self.updated.is_some()
    }

    /// Marks this entry as freshly synced, without touching its other
    /// fields.
    pub fn mark_synced(&mut self) {
        self.updated = Some(SystemTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registered_resource_is_synced() {
        let r = Resource::new_registered("foo.bar".into(), Key::zero(), 4200, 42);
        assert!(r.is_synced());
        assert_eq!(r.last_period, 0);
        assert_eq!(r.version, 0);
    }
}
