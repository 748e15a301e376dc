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

//! Wires `resource-core`'s `Handler` to a concrete `StoreFacade` and an
//! optional `resource-signer` validator for the `resourced` CLI. `main.rs`
//! owns argument parsing; this module owns building the handler and running
//! a single command against it.

pub mod config;
pub mod oracle;

use std::sync::Arc;

use rustc_hex::{FromHex, ToHex};

use resource_core::error::{Error, Result};
use resource_core::{Handler, Key, Validator};
use resource_signer::KeyPairValidator;
use resource_store::{LocalStore, RemoteFetch, StoreFacade};

use crate::config::Config;
use crate::oracle::StaticOracle;

/// No peer-to-peer transport is wired up: every run of this CLI is a single
/// process talking to its own local cache, so a remote miss is just a miss.
pub struct NoRemote;

impl RemoteFetch for NoRemote {
    fn fetch(&self, key: Key) -> Result<Vec<u8>> {
        Err(Error::NotFound(format!(
            "no network transport configured; {key:#x} is not in the local cache"
        )))
    }
}

pub type AppHandler = Handler<StoreFacade<NoRemote>, StaticOracle>;

/// Builds a handler over an in-memory `StoreFacade` (see DESIGN.md's Trims:
/// no grounded production call site for a persistent `kvdb-rocksdb` backend
/// was found in the teacher, so this CLI keeps `LocalStore::in_memory`) and
/// an optional `resource-signer` validator derived from `config`.
pub fn build_handler(config: &Config, block: u64) -> Result<AppHandler> {
    let facade = StoreFacade::new(LocalStore::in_memory(), NoRemote);
    let validator = build_validator(config)?;
    Ok(Handler::new(
        facade,
        StaticOracle::new(block),
        validator,
        config.handler_config(),
    ))
}

fn build_validator(config: &Config) -> Result<Option<Arc<dyn Validator>>> {
    let Some(secret_hex) = &config.validator_secret else {
        return Ok(None);
    };
    let secret_bytes: Vec<u8> = secret_hex
        .from_hex()
        .map_err(|e| Error::InvalidArgument(format!("validator_secret is not valid hex: {e}")))?;
    let secret = resource_signer::Secret::import_key(&secret_bytes)
        .map_err(|e| Error::CryptoError(e.to_string()))?;
    let authorized = config
        .authorized
        .iter()
        .map(|hex| parse_address(hex))
        .collect::<Result<Vec<_>>>()?;
    let validator = KeyPairValidator::new(secret)?.with_authorized(authorized);
    Ok(Some(Arc::new(validator)))
}

fn parse_address(hex: &str) -> Result<ethereum_types::Address> {
    let bytes: Vec<u8> = hex
        .from_hex()
        .map_err(|e| Error::InvalidArgument(format!("{hex:?} is not a valid hex address: {e}")))?;
    if bytes.len() != 20 {
        return Err(Error::InvalidArgument(format!(
            "{hex:?} is not a 20-byte address"
        )));
    }
    Ok(ethereum_types::Address::from_slice(&bytes))
}

/// One subcommand's worth of work, already parsed out of `clap` matches.
pub enum Command {
    NewResource { name: String, frequency: u64 },
    Update { name: String, data: Vec<u8> },
    LookupLatest { name: String, refresh: bool },
    LookupHistorical { name: String, period: u32, refresh: bool },
    LookupVersion { name: String, period: u32, version: u32, refresh: bool },
    GetLastPeriod { name: String },
    GetVersion { name: String },
    BlockToPeriod { name: String, block: u64 },
    PeriodToBlock { name: String, period: u32 },
}

/// Runs `command` against `handler` and renders the result as a line of
/// human-readable text (hex for hashes and binary payloads).
pub fn execute(handler: &AppHandler, command: Command) -> Result<String> {
    match command {
        Command::NewResource { name, frequency } => {
            let key = handler.new_resource(&name, frequency)?;
            Ok(format!("{key:#x}"))
        }
        Command::Update { name, data } => {
            // `update` requires a synced index entry; resync it from the
            // store first rather than relying on the caller having already
            // run a lookup. A resource with no updates yet still syncs here
            // (the root chunk load populates the index), so this only fails
            // when the resource was never registered at all.
            match handler.lookup_latest(&name, true) {
                Ok(_) | Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            let key = handler.update(&name, &data)?;
            Ok(format!("{key:#x}"))
        }
        Command::LookupLatest { name, refresh } => {
            let data = handler.lookup_latest(&name, refresh)?;
            Ok(data.to_hex::<String>())
        }
        Command::LookupHistorical { name, period, refresh } => {
            let data = handler.lookup_historical(&name, period, refresh)?;
            Ok(data.to_hex::<String>())
        }
        Command::LookupVersion { name, period, version, refresh } => {
            let data = handler.lookup_version(&name, period, version, refresh)?;
            Ok(data.to_hex::<String>())
        }
        Command::GetLastPeriod { name } => handler.get_last_period(&name).map(|p| p.to_string()),
        Command::GetVersion { name } => handler.get_version(&name).map(|v| v.to_string()),
        Command::BlockToPeriod { name, block } => handler.block_to_period(&name, block).map(|p| p.to_string()),
        Command::PeriodToBlock { name, period } => handler.period_to_block(&name, period).map(|b| b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resource_then_update_then_lookup_round_trips() {
        let config = Config::default();
        let handler = build_handler(&config, 0).unwrap();
        execute(
            &handler,
            Command::NewResource { name: "foo.bar".into(), frequency: 10 },
        )
        .unwrap();
        execute(
            &handler,
            Command::Update { name: "foo.bar".into(), data: b"hello".to_vec() },
        )
        .unwrap();
        let out = execute(
            &handler,
            Command::LookupLatest { name: "foo.bar".into(), refresh: false },
        )
        .unwrap();
        assert_eq!(out, b"hello".to_hex::<String>());
    }

    #[test]
    fn validator_secret_from_config_is_wired_in() {
        let mut config = Config::default();
        config.validator_secret = Some("00000000000000000000000000000000000000000000000000000000000000be".into());
        let handler = build_handler(&config, 0).unwrap();
        assert!(handler.is_validated());
    }
}
