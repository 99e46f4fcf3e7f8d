//! Fixtures and assertions shared by unit tests, integration tests, and
//! benchmarks.

use {
    crate::error::Result,
    ::git2::{Oid, Repository, Signature, Time},
};

/// A raw commit object, like `git cat-file commit HEAD` prints. Its ID is
/// `3dcde663d5f71d8799f11c06d577a1966667845c`.
pub const COMMIT: &str = "tree f39e8a9993875251359f11f3deb43241f7c3ce61\n\
                          parent 2148874f7bbe0aa96041b885e6622af1f9651381\n\
                          author Dev <dev@example.com> 1317498857 +0200\n\
                          committer Dev <dev@example.com> 1317498857 +0200\n\
                          \n\
                          fix(dog): no more puppies, 100% of the time\n";

/// The author and committer timestamp of every fixture commit.
pub const TIMESTAMP: i64 = 1_317_498_857;

/// Commits an empty tree on top of `HEAD` (if any) with a fixed signature
/// and [`TIMESTAMP`], so the resulting IDs are reproducible.
///
/// # Errors
///
/// For any Git failure.
pub fn fixture_commit(repo: &Repository, message: &str) -> Result<Oid> {
    let signature = Signature::new("Dev", "dev@example.com", &Time::new(TIMESTAMP, 120))?;
    let tree = repo.treebuilder(None)?.write()?;
    let tree = repo.find_tree(tree)?;
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };
    let parents = parent.iter().collect::<Vec<_>>();

    Ok(repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?)
}

/// Compares the [`Debug`][core::fmt::Debug] output of `actual` against an
/// inline snapshot.
#[track_caller]
pub fn assert_debug_eq(expected: ::expect_test::Expect, actual: impl ::core::fmt::Debug) {
    expected.assert_eq(&format!("{actual:?}"));
}

/// Compares the [`Display`][core::fmt::Display] output of `actual` against an
/// inline snapshot.
#[track_caller]
pub fn assert_display_eq(expected: ::expect_test::Expect, actual: impl ::core::fmt::Display) {
    expected.assert_eq(&format!("{actual}"));
}
