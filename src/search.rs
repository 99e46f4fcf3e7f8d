//! Brute-forcing commit timestamps until the commit ID has the prefix we want.

use {
    crate::{
        error::{Error, Result},
        git2::OidExt,
        hex::{decode_hex_nibbles, MaskedBytes},
        template::{CommitTemplate, Timestamp, TimestampFields},
    },
    ::{
        git2::{ObjectType, Oid},
        rayon::iter::{IntoParallelIterator, ParallelIterator},
        std::fmt::{self, Display},
        thousands::Separable,
        tracing::{debug, info, instrument, trace},
    },
};

/// How far into the future we'll move the committer timestamp by default.
pub const DEFAULT_MAX_MINUTES: u32 = 30;

/// Seconds added to the author and committer timestamps of a commit.
///
/// The author is never moved further than the committer, and the derived
/// ordering compares the committer offset first: it's the order in which
/// offsets are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetPair {
    /// Seconds added to the committer timestamp.
    pub committer: i64,
    /// Seconds added to the author timestamp.
    pub author: i64,
}

impl OffsetPair {
    /// # Panics
    ///
    /// If `author` is negative or greater than `committer`.
    #[must_use]
    pub fn new(author: i64, committer: i64) -> Self {
        assert!(
            0 <= author && author <= committer,
            "expected 0 <= author offset ({author}) <= committer offset ({committer})"
        );
        Self { committer, author }
    }

    /// Whether this pair leaves the commit unchanged.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.committer == 0 && self.author == 0
    }

    /// The number of pairs searched before this one.
    #[must_use]
    pub fn ordinal(&self) -> u64 {
        let committer = self.committer.unsigned_abs();
        committer * (committer + 1) / 2 + self.author.unsigned_abs()
    }
}

/// Every [`OffsetPair`] with a committer offset of at most `max_seconds`, in
/// search order: by committer offset, then by author offset.
pub fn offsets(max_seconds: i64) -> impl Iterator<Item = OffsetPair> {
    (0..=max_seconds)
        .flat_map(|committer| (0..=committer).map(move |author| OffsetPair { committer, author }))
}

/// The number of candidates in a search bounded by `max_minutes`.
#[must_use]
pub fn search_space(max_minutes: u32) -> u64 {
    let seconds = u64::from(max_minutes) * 60 + 1;
    seconds * (seconds + 1) / 2
}

/// What a successful search found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The commit ID already has the prefix.
    NoOp,
    /// Moving the timestamps gives a commit ID with the prefix.
    Found(Proposal),
}

/// New timestamps for a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// How far each timestamp moved.
    pub offsets: OffsetPair,
    /// The new author timestamp.
    pub author: Timestamp,
    /// The new committer timestamp.
    pub committer: Timestamp,
    /// The ID of the commit with the new timestamps.
    pub id: Oid,
    /// How many candidates were hashed, including the match.
    pub candidates: u64,
}

/// The command that amends `HEAD` with the proposed timestamps.
impl Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GIT_COMMITTER_DATE='{}' git commit --amend -C HEAD --date='{}'",
            self.committer, self.author
        )
    }
}

/// Searches for timestamps that give a commit ID starting with `prefix`,
/// using every available thread.
///
/// # Errors
///
/// [`Error::InvalidPrefix`] or [`Error::PrefixTooLong`] before any hashing,
/// or [`Error::Exhausted`] if nothing within `max_minutes` matches.
pub fn search(
    template: &CommitTemplate,
    base: &TimestampFields,
    prefix: &str,
    max_minutes: u32,
) -> Result<SearchOutcome> {
    Searcher::new(template, base, prefix)?
        .max_minutes(max_minutes)
        .search()
}

/// A configured search over the timestamps of one commit.
#[derive(Debug, Clone)]
#[must_use]
pub struct Searcher<'a> {
    template: &'a CommitTemplate,
    base: &'a TimestampFields,
    prefix: String,
    target: MaskedBytes,
    max_minutes: u32,
    parallel: bool,
}

impl<'a> Searcher<'a> {
    /// # Errors
    ///
    /// [`Error::InvalidPrefix`] or [`Error::PrefixTooLong`].
    pub fn new(
        template: &'a CommitTemplate,
        base: &'a TimestampFields,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let target = decode_hex_nibbles(&prefix)?;
        trace!("Searching for {prefix:?} as {target:2x?}");

        Ok(Self {
            template,
            base,
            prefix,
            target,
            max_minutes: DEFAULT_MAX_MINUTES,
            parallel: true,
        })
    }

    /// Limits how far into the future the timestamps may move.
    pub fn max_minutes(mut self, max_minutes: u32) -> Self {
        self.max_minutes = max_minutes;
        self
    }

    /// Whether to split the search across the [`rayon`] thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The ID the commit would have with the timestamps moved by `offsets`.
    #[must_use]
    pub fn candidate_digest(&self, offsets: OffsetPair) -> [u8; 20] {
        let mut body = Vec::new();
        self.digest_into(&mut body, offsets)
    }

    #[inline]
    fn digest_into(&self, body: &mut Vec<u8>, offsets: OffsetPair) -> [u8; 20] {
        self.template.render_into(
            body,
            self.base.author.seconds + offsets.author,
            self.base.committer.seconds + offsets.committer,
        );
        Oid::digest_object(ObjectType::Commit, body)
    }

    /// Finds the smallest committer offset, and then the smallest author
    /// offset, that gives the commit ID our prefix.
    ///
    /// # Errors
    ///
    /// [`Error::Exhausted`] if no offsets within the bound match.
    #[instrument(level = "debug", skip_all, fields(prefix = %self.prefix, max_minutes = self.max_minutes))]
    pub fn search(&self) -> Result<SearchOutcome> {
        let max_seconds = i64::from(self.max_minutes) * 60;

        let found = if self.parallel {
            debug!("Searching across {} threads", rayon::current_num_threads());
            (0..=max_seconds)
                .into_par_iter()
                .find_map_first(|committer| self.search_row(committer))
        } else {
            debug!("Searching sequentially");
            (0..=max_seconds).find_map(|committer| self.search_row(committer))
        };

        let offsets = match found {
            Some(offsets) => offsets,
            None => {
                let candidates = search_space(self.max_minutes);
                info!(
                    "Tried all {} candidates without a match",
                    candidates.separate_with_underscores()
                );
                return Err(Error::Exhausted {
                    prefix: self.prefix.clone(),
                    max_minutes: self.max_minutes,
                    candidates,
                });
            },
        };

        let candidates = offsets.ordinal() + 1;
        info!(
            "Found a match after {} candidates, at {offsets:?}",
            candidates.separate_with_underscores()
        );

        if offsets.is_zero() {
            return Ok(SearchOutcome::NoOp);
        }

        let author = self.base.author.shifted(offsets.author);
        let committer = self.base.committer.shifted(offsets.committer);
        let id = Oid::from_bytes(&self.candidate_digest(offsets))?;

        Ok(SearchOutcome::Found(Proposal {
            offsets,
            author,
            committer,
            id,
            candidates,
        }))
    }

    /// Searches every author offset for one committer offset.
    fn search_row(&self, committer: i64) -> Option<OffsetPair> {
        let mut body = Vec::new();
        (0..=committer)
            .map(|author| OffsetPair { committer, author })
            .find(|&offsets| self.target.matches(&self.digest_into(&mut body, offsets)))
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{template::commit_to_template, testing::COMMIT},
    };

    fn fixture() -> (CommitTemplate, TimestampFields) {
        commit_to_template(COMMIT.as_bytes()).unwrap()
    }

    #[test]
    fn offsets_are_ordered() {
        let all = offsets(3).collect::<Vec<_>>();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0], OffsetPair::new(0, 0));
        assert_eq!(all[1], OffsetPair::new(0, 1));
        assert_eq!(all[2], OffsetPair::new(1, 1));
        assert_eq!(all[9], OffsetPair::new(3, 3));
        assert!(all.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(all.iter().all(|offsets| offsets.author <= offsets.committer));
        assert!(all
            .iter()
            .enumerate()
            .all(|(index, offsets)| offsets.ordinal() == index as u64));
    }

    #[test]
    fn search_space_matches_offsets() {
        assert_eq!(search_space(0), 1);
        assert_eq!(search_space(1), offsets(60).count() as u64);
        assert_eq!(search_space(30), 1801 * 1802 / 2);
    }

    #[test]
    #[should_panic]
    fn author_never_passes_committer() {
        let _ = OffsetPair::new(2, 1);
    }

    #[test]
    fn finds_smallest_offsets() {
        let (template, fields) = fixture();
        let outcome = search(&template, &fields, "000", DEFAULT_MAX_MINUTES).unwrap();

        let proposal = match outcome {
            SearchOutcome::Found(proposal) => proposal,
            SearchOutcome::NoOp => panic!("expected new timestamps"),
        };
        assert_eq!(proposal.offsets, OffsetPair::new(26, 44));
        assert_eq!(proposal.candidates, 1017);
        assert_eq!(proposal.id.to_string(), "00058d397e38077b1806ea731e8b6b1d7a19a9ff");
        assert_eq!(proposal.author.to_string(), "1317498883 +0200");
        assert_eq!(proposal.committer.to_string(), "1317498901 +0200");

        let searcher = Searcher::new(&template, &fields, "000").unwrap();
        for earlier in offsets(44).take_while(|&offsets| offsets < proposal.offsets) {
            assert!(!hex::encode(searcher.candidate_digest(earlier)).starts_with("000"));
        }
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let (template, fields) = fixture();
        for prefix in ["0", "00", "beef"] {
            let searcher = Searcher::new(&template, &fields, prefix).unwrap();
            let parallel = searcher.clone().parallel(true).search().unwrap();
            let sequential = searcher.parallel(false).search().unwrap();
            assert_eq!(parallel, sequential, "for prefix {prefix:?}");
        }
    }

    #[test]
    fn unchanged_commit_is_a_noop() {
        let (template, fields) = fixture();
        assert_eq!(search(&template, &fields, "3dc", 30).unwrap(), SearchOutcome::NoOp);
        assert_eq!(search(&template, &fields, "", 0).unwrap(), SearchOutcome::NoOp);
        assert_eq!(
            search(&template, &fields, "3dcde663d5f71d8799f11c06d577a1966667845c", 0).unwrap(),
            SearchOutcome::NoOp
        );
    }

    #[test]
    fn exhausts_bounded_search() {
        let (template, fields) = fixture();
        match search(&template, &fields, "0123456789", 1) {
            Err(Error::Exhausted {
                prefix,
                max_minutes,
                candidates,
            }) => {
                assert_eq!(prefix, "0123456789");
                assert_eq!(max_minutes, 1);
                assert_eq!(candidates, 61 * 62 / 2);
            },
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_prefixes_before_searching() {
        let (template, fields) = fixture();
        for prefix in ["ABC", "0x12", "g", "12 34", "-"] {
            assert!(
                matches!(
                    search(&template, &fields, prefix, 30),
                    Err(Error::InvalidPrefix { .. })
                ),
                "accepted {prefix:?}"
            );
        }
        assert!(matches!(
            search(&template, &fields, &"0".repeat(41), 30),
            Err(Error::PrefixTooLong { len: 41, .. })
        ));
    }

    #[test]
    fn proposes_amend_command() {
        let proposal = Proposal {
            offsets: OffsetPair::new(0, 112),
            author: Timestamp {
                seconds: 1_317_498_857,
                timezone: "+0200".into(),
            },
            committer: Timestamp {
                seconds: 1_317_498_969,
                timezone: "+0200".into(),
            },
            id: Oid::zero(),
            candidates: 6329,
        };
        assert_eq!(
            proposal.to_string(),
            "GIT_COMMITTER_DATE='1317498969 +0200' git commit --amend -C HEAD --date='1317498857 \
             +0200'"
        );
    }
}
