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

//! Name safety: a resource name must be non-empty and IDNA-ASCII-stable.

use crate::error::{Error, Result};

/// Returns `Ok(())` iff `name` is non-empty and equal to its own IDNA ASCII
/// form. Mirrors the reference check: "a name is safe iff it is non-empty
/// and equals its own ASCII form".
pub fn check_safe(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("empty name".into()));
    }
    match idna::domain_to_ascii(name) {
        Ok(ascii) if ascii == name => Ok(()),
        Ok(ascii) => Err(Error::InvalidArgument(format!(
            "name {name:?} is not IDNA-ASCII-stable (ascii form is {ascii:?})"
        ))),
        Err(_) => Err(Error::InvalidArgument(format!(
            "name {name:?} failed IDNA normalization"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_already_ascii_names() {
        check_safe("foo.bar").unwrap();
    }

    #[test]
    fn rejects_empty_name() {
        assert!(check_safe("").is_err());
    }

    #[test]
    fn rejects_mixed_case_name() {
        // to_ascii("Foo.Bar") == "foo.bar" != "Foo.Bar"
        assert!(check_safe("Foo.Bar").is_err());
    }
}
