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

//! Error type surfaced by every `resource-core` operation.

use std::{fmt, io};

/// Errors produced by the resource-update protocol layer.
#[derive(Debug)]
pub enum Error {
    /// Bad caller input: zero frequency, unsafe name, zero period, oversized
    /// data, or a decoded chunk whose name doesn't match the cached one.
    InvalidArgument(String),
    /// A lookup walk found nothing, or a root chunk is absent.
    NotFound(String),
    /// The named resource has never been synced (or doesn't exist) in the
    /// index.
    NotSynced(String),
    /// A chunk's on-disk layout doesn't match the expected format.
    MalformedChunk(String),
    /// `check_access` rejected the recovered signer.
    AuthorizationFailed,
    /// Signing or recovery failed, or the crypto primitive itself errored.
    CryptoError(String),
    /// A bounded wait (e.g. network retrieval) exceeded its deadline.
    Timeout,
    /// An error propagated from the block oracle or the chunk store.
    Upstream(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::NotSynced(msg) => write!(f, "resource not synced: {msg}"),
            Error::MalformedChunk(msg) => write!(f, "malformed chunk: {msg}"),
            Error::AuthorizationFailed => write!(f, "authorization failed"),
            Error::CryptoError(msg) => write!(f, "crypto error: {msg}"),
            Error::Timeout => write!(f, "timed out"),
            Error::Upstream(e) => write!(f, "upstream error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Upstream(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Upstream(Box::new(e))
    }
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
