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

//! The in-memory `name -> Resource` cache (§3, §5): one `RwLock` over the
//! whole map, the same choke-point-but-simple shape
//! `crates/ethcore/src/miner/miner.rs` uses for its own shared caches.

use crate::resource::Resource;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe `name -> Resource` mapping. Readers take a shared lock,
/// writers an exclusive one. `set_resource` happens-before any subsequent
/// `get_resource` for the same name.
#[derive(Default)]
pub struct ResourceIndex {
    entries: RwLock<HashMap<String, Resource>>,
}

impl ResourceIndex {
    /// An empty index.
    pub fn new() -> Self {
        ResourceIndex {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a clone of the cached entry for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Resource> {
        self.entries.read().get(name).cloned()
    }

    /// Inserts or overwrites the cached entry for `resource.name`.
    pub fn set(&self, resource: Resource) {
        self.entries.write().insert(resource.name.clone(), resource);
    }

    /// Removes the cached entry for `name`, if any.
    pub fn remove(&self, name: &str) -> Option<Resource> {
        self.entries.write().remove(name)
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True iff no resource is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;

    #[test]
    fn set_then_get_round_trips() {
        let index = ResourceIndex::new();
        assert!(index.get("foo.bar").is_none());
        index.set(Resource::new_registered(
            "foo.bar".into(),
            Key::zero(),
            4200,
            42,
        ));
        let got = index.get("foo.bar").unwrap();
        assert_eq!(got.start_block, 4200);
        assert_eq!(got.frequency, 42);
    }
}
