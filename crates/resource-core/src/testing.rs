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

//! Test doubles for `ChunkStore` and `BlockOracle`, in the same spirit as
//! the teacher's own hand-written service mocks (e.g.
//! `crates/rpc/src/v1/tests/helpers/miner_service.rs`). Used by this crate's
//! own unit tests and by `tests/scenarios.rs`.

use crate::chunkstore::{Chunk, ChunkStore};
use crate::error::{Error, Result};
use crate::oracle::BlockOracle;
use crate::Key;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An in-memory `ChunkStore`: every `put` is immediately visible to `get`.
#[derive(Default)]
pub struct InMemoryStore {
    chunks: RwLock<HashMap<Key, Vec<u8>>>,
    closed: Mutex<bool>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    /// Number of chunks currently stored.
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }
}

impl ChunkStore for InMemoryStore {
    fn get(&self, key: Key) -> Result<Chunk> {
        if *self.closed.lock() {
            return Err(Error::Upstream("store is closed".into()));
        }
        self.chunks
            .read()
            .get(&key)
            .cloned()
            .map(|data| Chunk::new(key, data))
            .ok_or_else(|| Error::NotFound(format!("no chunk at {key:#x}")))
    }

    fn put(&self, chunk: Chunk) -> Result<()> {
        if *self.closed.lock() {
            return Err(Error::Upstream("store is closed".into()));
        }
        self.chunks.write().insert(chunk.key, chunk.data);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}

/// A `BlockOracle` whose current height can be moved forward by the test.
/// Clones share the same counter, so a test can keep a handle to advance the
/// clock after handing a clone to a `Handler`.
#[derive(Clone)]
pub struct FixedOracle {
    height: Arc<AtomicU64>,
}

impl FixedOracle {
    /// An oracle that starts at `height`.
    pub fn new(height: u64) -> Self {
        FixedOracle {
            height: Arc::new(AtomicU64::new(height)),
        }
    }

    /// Advances (or rewinds) the oracle to `height`.
    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl BlockOracle for FixedOracle {
    fn current_block(&self) -> Result<u64> {
        Ok(self.height.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_put_then_get_round_trips() {
        let store = InMemoryStore::new();
        let key = Key::from_low_u64_be(1);
        store.put(Chunk::new(key, b"hello".to_vec())).unwrap();
        assert_eq!(store.get(key).unwrap().data, b"hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn in_memory_store_rejects_ops_after_close() {
        let store = InMemoryStore::new();
        store.close().unwrap();
        assert!(store.get(Key::zero()).is_err());
        assert!(store.put(Chunk::new(Key::zero(), vec![])).is_err());
    }

    #[test]
    fn fixed_oracle_clones_share_state() {
        let a = FixedOracle::new(10);
        let b = a.clone();
        b.set(20);
        assert_eq!(a.current_block().unwrap(), 20);
    }
}
