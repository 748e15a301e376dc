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

//! CLI entry point. A one-shot wrapper around `resourced::execute`: parse
//! arguments, build a handler over a config file's defaults, run exactly one
//! command, print its result, exit. Nothing here persists across
//! invocations except whatever `Config::validator_secret`/`authorized`
//! describe.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rustc_hex::FromHex;

use resourced::config::Config;
use resourced::{build_handler, execute, Command};

#[derive(Parser)]
#[command(name = "resourced", about = "Mutable resource update CLI")]
struct Cli {
    /// Path to a TOML config file (store_timeout_ms, validator_secret, authorized).
    #[arg(long, default_value = "resourced.toml")]
    config: PathBuf,

    /// Current block height of the ledger this resource is anchored to.
    #[arg(long)]
    block: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a brand-new resource and write its root chunk.
    NewResource {
        name: String,
        /// Blocks per update period.
        frequency: u64,
    },
    /// Publish a new update for an already-registered, synced resource.
    Update {
        name: String,
        /// Hex-encoded payload (no `0x` prefix).
        data_hex: String,
    },
    /// Fetch the newest update at or before the current period.
    LookupLatest {
        name: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch the newest update at or before a given period.
    LookupHistorical {
        name: String,
        period: u32,
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch one exact (period, version) update.
    LookupVersion {
        name: String,
        period: u32,
        version: u32,
        #[arg(long)]
        refresh: bool,
    },
    /// The last period this resource was seen updated in.
    GetLastPeriod { name: String },
    /// The version number of the last seen update.
    GetVersion { name: String },
    /// The period a given block height falls into.
    BlockToPeriod { name: String, block: u64 },
    /// The first block height of a given period.
    PeriodToBlock { name: String, period: u32 },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> resource_core::error::Result<String> {
    let config = Config::load(&cli.config)?;
    let handler = build_handler(&config, cli.block)?;

    let command = match cli.command {
        Commands::NewResource { name, frequency } => Command::NewResource { name, frequency },
        Commands::Update { name, data_hex } => {
            let data = data_hex.from_hex().map_err(|e| {
                resource_core::error::Error::InvalidArgument(format!("data_hex is not valid hex: {e}"))
            })?;
            Command::Update { name, data }
        }
        Commands::LookupLatest { name, refresh } => Command::LookupLatest { name, refresh },
        Commands::LookupHistorical { name, period, refresh } => {
            Command::LookupHistorical { name, period, refresh }
        }
        Commands::LookupVersion { name, period, version, refresh } => {
            Command::LookupVersion { name, period, version, refresh }
        }
        Commands::GetLastPeriod { name } => Command::GetLastPeriod { name },
        Commands::GetVersion { name } => Command::GetVersion { name },
        Commands::BlockToPeriod { name, block } => Command::BlockToPeriod { name, block },
        Commands::PeriodToBlock { name, period } => Command::PeriodToBlock { name, period },
    };

    execute(&handler, command)
}
