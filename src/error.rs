//! Everything that can stop us from proposing new timestamps.

/// The error type for this crate's library functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target prefix contains something other than lowercase hex digits.
    #[error("invalid prefix {prefix:?}: {character:?} is not a lowercase hex digit")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
        /// The first offending character.
        character: char,
    },

    /// The target prefix is longer than a commit ID.
    #[error("prefix {prefix:?} has {len} characters, but commit IDs only have 40")]
    PrefixTooLong {
        /// The rejected prefix.
        prefix: String,
        /// Its length, in hex digits.
        len: usize,
    },

    /// Reading from the Git repository failed.
    #[error(transparent)]
    Git(#[from] ::git2::Error),

    /// Creating a scratch directory failed.
    #[error(transparent)]
    Io(#[from] ::std::io::Error),

    /// The commit object doesn't have the shape we expect from Git.
    #[error("malformed commit object: {0}")]
    MalformedCommit(String),

    /// The commit template doesn't reproduce the commit it was built from.
    #[error("commit template renders to {actual} instead of {expected}")]
    TemplateMismatch {
        /// The ID of the loaded commit.
        expected: String,
        /// The ID of the template rendered with the original timestamps.
        actual: String,
    },

    /// The commit to beautify isn't `HEAD`, so `git commit --amend` can't
    /// rewrite it.
    #[error("{revision} is commit {id}, but only HEAD ({head}) can be amended")]
    NotHead {
        /// The requested revision.
        revision: String,
        /// The commit it resolves to.
        id: String,
        /// The commit `HEAD` resolves to.
        head: String,
    },

    /// Every candidate in the search space was tried without a match.
    #[error(
        "no commit ID starting with {prefix:?} within {max_minutes} minutes ({candidates} \
         candidates tried)"
    )]
    Exhausted {
        /// The target prefix.
        prefix: String,
        /// The search bound.
        max_minutes: u32,
        /// How many candidate digests were computed.
        candidates: u64,
    },

    /// An automatic prefix was requested with a zero-digit counter.
    #[error("automatic prefixes need a counter of at least one digit")]
    ZeroDigits,

    /// The previous commit ID doesn't start with a decimal counter.
    #[error("can't derive a prefix from previous commit {id}: {leading:?} is not a decimal number")]
    UnderivablePrefix {
        /// The previous commit ID.
        id: String,
        /// The leading characters we tried to parse.
        leading: String,
    },
}

/// A [`Result`][std::result::Result] defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = ::std::result::Result<T, E>;
