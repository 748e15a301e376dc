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

//! `resource-core` implements the mutable-resource-update protocol: the
//! key-derivation scheme, chunk codec, lookup walk and update algorithm, and
//! the in-memory resource index, as laid out in SPEC_FULL.md. It depends only
//! on the narrow trait boundaries (`ChunkStore`, `BlockOracle`, `Validator`)
//! defined here — concrete adapters live in `resource-store` and
//! `resource-signer`.

pub mod chunkstore;
pub mod codec;
pub mod error;
pub mod handler;
pub mod index;
pub mod keyderiver;
pub mod name;
pub mod oracle;
pub mod resource;
pub mod testing;
pub mod validator;

pub use chunkstore::{Chunk, ChunkStore};
pub use error::{Error, Result};
pub use handler::{Handler, HandlerConfig};
pub use index::ResourceIndex;
pub use keyderiver::KeyDeriver;
pub use oracle::BlockOracle;
pub use resource::Resource;
pub use validator::Validator;

/// A 32-byte hash: used both as the root chunk key (a namehash) and as the
/// update chunk key (`resource_hash`).
pub type Key = ethereum_types::H256;

/// A 65-byte recoverable ECDSA signature (`r ‖ s ‖ v`).
pub type Signature65 = [u8; 65];
