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

//! A one-shot CLI invocation has no long-running connection to the ledger
//! this resource layer tracks block heights against, so the current height
//! is simply a command-line argument rather than something polled from a
//! live node.

use resource_core::error::Result;
use resource_core::oracle::BlockOracle;

/// Reports the block height the caller passed on the command line.
pub struct StaticOracle {
    block: u64,
}

impl StaticOracle {
    pub fn new(block: u64) -> Self {
        StaticOracle { block }
    }
}

impl BlockOracle for StaticOracle {
    fn current_block(&self) -> Result<u64> {
        Ok(self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_configured_height() {
        let oracle = StaticOracle::new(42);
        assert_eq!(oracle.current_block().unwrap(), 42);
    }
}
