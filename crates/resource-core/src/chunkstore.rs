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

//! The chunk store boundary (§4.7, §6): `Get`, `Put`, `Close`. The concrete
//! local+network facade (in-flight request tracking, the 1 s in-flight wait,
//! the local cache) lives in the `resource-store` crate; this trait is the
//! narrow interface the Handler actually calls through.

use crate::error::Result;
use crate::Key;

/// An immutable, content-addressed chunk as handed back by a `ChunkStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk's content-address.
    pub key: Key,
    /// The raw payload bytes (root payload or encoded update payload).
    pub data: Vec<u8>,
}

impl Chunk {
    /// Builds a chunk from its key and payload.
    pub fn new(key: Key, data: Vec<u8>) -> Self {
        Chunk { key, data }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Narrow storage interface the Handler issues `Get`/`Put` against.
///
/// Implementations are expected to be safe for concurrent use; the protocol
/// layer never serializes access to the store itself.
pub trait ChunkStore: Send + Sync {
    /// Retrieves the chunk stored at `key`, or an error (including
    /// [`crate::Error::NotFound`] / [`crate::Error::Timeout`]) if it cannot
    /// be retrieved.
    fn get(&self, key: Key) -> Result<Chunk>;

    /// Stores `chunk`. Whether this call waits for acknowledgement (and how
    /// long) is a policy decision of the concrete facade, not of this trait —
    /// see `resource-store::facade::StoreFacade` and §4.5 step 6.
    fn put(&self, chunk: Chunk) -> Result<()>;

    /// Releases any resources held by the store. Operations issued after
    /// `close` are undefined.
    fn close(&self) -> Result<()>;
}
