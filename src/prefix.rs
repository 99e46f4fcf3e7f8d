//! Choosing the prefix to search for.

use {
    crate::{
        error::{Error, Result},
        hex::decode_hex_nibbles,
    },
    std::str::FromStr,
    tracing::{debug, instrument},
};

/// The `PREFIX` argument value that asks for [`propose_prefix`].
pub const AUTO: &str = "auto";

/// How many leading digits of the previous commit ID are used as a counter.
pub const DEFAULT_DIGITS: usize = 4;

/// What follows the counter in an automatic prefix.
pub const DEFAULT_SUFFIX: &str = "a";

/// The prefix requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixArg {
    /// A specific lowercase hex prefix.
    Explicit(String),
    /// Count up from the previous commit's prefix.
    Auto,
}

impl FromStr for PrefixArg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == AUTO {
            Ok(PrefixArg::Auto)
        } else {
            decode_hex_nibbles(s)?;
            Ok(PrefixArg::Explicit(s.to_string()))
        }
    }
}

/// Derives a prefix that counts up from the previous commit's, like `0001a`,
/// `0002a`, `0003a`, ...
///
/// The first `digits` characters of `previous_id` are read as a decimal
/// number, incremented, and zero-padded back to `digits` characters before
/// `suffix` is appended. With no previous commit, the count starts at `1`.
///
/// # Errors
///
/// [`Error::UnderivablePrefix`] if the leading characters of `previous_id`
/// aren't all decimal digits, which is the case for most commit IDs that
/// weren't themselves given an automatic prefix. [`Error::ZeroDigits`] if
/// `digits` is zero, with or without a previous commit.
#[instrument(level = "debug")]
pub fn propose_prefix(previous_id: Option<&str>, digits: usize, suffix: &str) -> Result<String> {
    if digits == 0 {
        return Err(Error::ZeroDigits);
    }

    let count: u64 = match previous_id {
        None => 1,
        Some(id) => {
            let leading = id.get(..digits).unwrap_or(id);
            let underivable = || Error::UnderivablePrefix {
                id: id.to_string(),
                leading: leading.to_string(),
            };

            if !leading.bytes().all(|byte| byte.is_ascii_digit()) {
                return Err(underivable());
            }

            let previous: u64 = leading.parse().map_err(|_| underivable())?;
            previous.checked_add(1).ok_or_else(underivable)?
        },
    };

    let prefix = format!("{count:0digits$}{suffix}");
    debug!("Proposed prefix {prefix:?}");
    Ok(prefix)
}
