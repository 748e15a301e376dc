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

//! The `ChunkStore` facade (§4.7): a local `kvdb`-backed cache composed with
//! a pluggable network retrieval layer, implementing `resource_core::ChunkStore`.

pub mod facade;
pub mod local;
pub mod network;

pub use facade::StoreFacade;
pub use local::LocalStore;
pub use network::{NetworkStore, RemoteFetch};
