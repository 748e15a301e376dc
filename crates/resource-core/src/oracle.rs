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

//! The block-height oracle (§6): `header_by_number(None) -> { number }`,
//! consumed here as a bare 64-bit height. Errors propagate verbatim.

use crate::error::Result;

/// Supplies the current block height of some external ledger.
pub trait BlockOracle: Send + Sync {
    /// The height of the latest known block.
    fn current_block(&self) -> Result<u64>;
}
