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

//! A small `serde`/`toml` config file carrying the handful of defaults this
//! CLI needs, in the spirit of `bin/oe/configuration.rs` but without its
//! hundreds of docopt-derived fields — this crate's `HandlerConfig` and
//! `StoreFacade` only have a few knobs to begin with.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use resource_core::error::{Error, Result};

/// Deserialized straight from a TOML file; every field has a sensible
/// default so the file itself is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long `update` waits for the store's put acknowledgement before
    /// returning anyway. Milliseconds; see `HandlerConfig::store_timeout`.
    pub store_timeout_ms: u64,
    /// Raw 32-byte secp256k1 secret, hex-encoded (no `0x` prefix). When
    /// absent, the handler runs unvalidated: any caller can publish.
    pub validator_secret: Option<String>,
    /// Hex-encoded addresses (no `0x` prefix) allowed to publish. Empty
    /// means "anyone the validator can recover a signature for".
    pub authorized: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_timeout_ms: 4000,
            validator_secret: None,
            authorized: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `path` if it exists; returns the all-defaults config otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::InvalidArgument(format!("bad config file {path:?}: {e}")))
    }

    pub fn handler_config(&self) -> resource_core::HandlerConfig {
        resource_core::HandlerConfig {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/no/such/file/resourced.toml")).unwrap();
        assert_eq!(config.store_timeout_ms, 4000);
        assert!(config.validator_secret.is_none());
    }

    #[test]
    fn parses_partial_overrides() {
        let dir = TempDir::new("resourced-config-test").unwrap();
        let path = dir.path().join("resourced.toml");
        fs::write(&path, "store_timeout_ms = 1500\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.store_timeout_ms, 1500);
        assert!(config.authorized.is_empty());
    }
}
