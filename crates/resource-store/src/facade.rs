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

//! Wires `LocalStore` + `NetworkStore` behind `resource_core::ChunkStore`,
//! the narrow interface `Handler` actually calls through.

use std::sync::Arc;

use resource_core::chunkstore::{Chunk, ChunkStore};
use resource_core::error::Result;
use resource_core::Key;

use crate::local::LocalStore;
use crate::network::{NetworkStore, RemoteFetch};

/// The concrete `ChunkStore` a `resource_core::Handler` is built over.
pub struct StoreFacade<F> {
    network: NetworkStore<F>,
}

impl<F: RemoteFetch + 'static> StoreFacade<F> {
    /// Composes a local cache with a remote retrieval transport.
    pub fn new(local: LocalStore, remote: F) -> Self {
        StoreFacade {
            network: NetworkStore::new(Arc::new(local), Arc::new(remote)),
        }
    }

    /// A facade with an in-memory-only local cache.
    pub fn in_memory(remote: F) -> Self {
        StoreFacade::new(LocalStore::in_memory(), remote)
    }
}

impl<F: RemoteFetch + 'static> ChunkStore for StoreFacade<F> {
    fn get(&self, key: Key) -> Result<Chunk> {
        self.network.get(key)
    }

    fn put(&self, chunk: Chunk) -> Result<()> {
        self.network.put(chunk)
    }

    fn close(&self) -> Result<()> {
        self.network.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::error::Error;

    struct NullRemote;

    impl RemoteFetch for NullRemote {
        fn fetch(&self, key: Key) -> Result<Vec<u8>> {
            Err(Error::NotFound(format!("no peers for {key:#x}")))
        }
    }

    #[test]
    fn put_then_get_round_trips_through_local_cache() {
        let facade = StoreFacade::in_memory(NullRemote);
        let key = Key::from_low_u64_be(11);
        facade.put(Chunk::new(key, b"data".to_vec())).unwrap();
        assert_eq!(facade.get(key).unwrap().data, b"data");
    }

    #[test]
    fn get_miss_propagates_remote_error() {
        let facade = StoreFacade::in_memory(NullRemote);
        assert!(facade.get(Key::zero()).is_err());
    }
}
