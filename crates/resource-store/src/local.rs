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

//! The local chunk cache: a thin wrapper over any `kvdb::KeyValueDB`, the
//! same abstraction `crates/db/db` builds its column-family access on top of.

use std::sync::Arc;

use kvdb::KeyValueDB;
use resource_core::error::{Error, Result};
use resource_core::{Chunk, Key};

const COL_CHUNKS: u32 = 0;

/// A content-addressed chunk cache backed by a `kvdb::KeyValueDB`.
///
/// Defaults to an in-memory backend; swap in a disk-backed `KeyValueDB` (e.g.
/// `kvdb-rocksdb`) for a persistent cache without touching the rest of the
/// store facade.
pub struct LocalStore {
    db: Arc<dyn KeyValueDB>,
}

impl LocalStore {
    /// Wraps an existing `KeyValueDB` handle (single column, index 0).
    pub fn new(db: Arc<dyn KeyValueDB>) -> Self {
        LocalStore { db }
    }

    /// An ephemeral, process-local cache.
    pub fn in_memory() -> Self {
        LocalStore::new(Arc::new(kvdb_memorydb::create(1)))
    }

    /// Retrieves a chunk by key, or `NotFound` if it isn't cached locally.
    pub fn get(&self, key: Key) -> Result<Chunk> {
        let data = self
            .db
            .get(COL_CHUNKS, key.as_bytes())?
            .ok_or_else(|| Error::NotFound(format!("no local chunk at {key:#x}")))?;
        Ok(Chunk::new(key, data))
    }

    /// Writes a chunk into the local cache, overwriting any prior value at
    /// the same key.
    pub fn put(&self, chunk: &Chunk) -> Result<()> {
        let mut tx = self.db.transaction();
        tx.put(COL_CHUNKS, chunk.key.as_bytes(), &chunk.data);
        self.db.write(tx)?;
        Ok(())
    }

    /// Flushes any buffered writes.
    pub fn close(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let store = LocalStore::in_memory();
        let key = Key::from_low_u64_be(9);
        store.put(&Chunk::new(key, b"payload".to_vec())).unwrap();
        assert_eq!(store.get(key).unwrap().data, b"payload");
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let store = LocalStore::in_memory();
        assert!(matches!(store.get(Key::zero()), Err(Error::NotFound(_))));
    }
}
