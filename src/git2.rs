//! Loading commits through [`::git2`] (`libgit2`).

use {
    crate::error::Result,
    ::{
        digest::{generic_array::GenericArray, typenum::U20, Digest},
        git2::{ErrorCode, ObjectType, Oid, Repository},
        std::{
            borrow::Borrow,
            fmt::Debug,
            ops::{Deref, DerefMut},
        },
        tempfile::TempDir,
        tracing::{debug, instrument},
    },
};

/// Extension methods for [`Repository`].
///
/// These methods are all read-only: nothing in the repository is written or
/// modified.
pub trait RepositoryExt: Borrow<Repository> {
    /// Returns the ID and the raw bytes of the commit object named by
    /// `revision`, exactly as stored (like `git cat-file commit <revision>`).
    ///
    /// # Errors
    ///
    /// If `revision` can't be resolved to a commit or the object can't be
    /// read.
    #[instrument(level = "debug", skip(self))]
    fn raw_commit(&self, revision: &str) -> Result<(Oid, Vec<u8>)> {
        let repo: &Repository = self.borrow();

        let commit = repo.revparse_single(revision)?.peel_to_commit()?;
        let odb = repo.odb()?;
        let object = odb.read(commit.id())?;
        let body = object.data().to_vec();

        debug!("Loaded {} bytes of commit {}", body.len(), commit.id());

        Ok((commit.id(), body))
    }

    /// Resolves `revision` to a commit ID, or `None` if there is no such
    /// commit (such as the parent of an initial commit).
    ///
    /// # Errors
    ///
    /// For any Git failure other than the revision not existing.
    #[instrument(level = "debug", skip(self))]
    fn resolve_commit_id(&self, revision: &str) -> Result<Option<Oid>> {
        let repo: &Repository = self.borrow();

        match repo.revparse_single(revision) {
            Ok(object) => Ok(Some(object.peel_to_commit()?.id())),
            Err(err)
                if matches!(
                    err.code(),
                    ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::UnbornBranch
                ) =>
            {
                debug!("No commit found for {revision:?}: {}", err.message());
                Ok(None)
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Creates a [`Repository`] backed by a new temporary directory.
    ///
    /// # Errors
    ///
    /// If the directory or repository can't be created.
    #[instrument(level = "debug", skip_all)]
    fn temporary() -> Result<TemporaryRepository> {
        let dir = TempDir::new()?;
        let repo = Repository::init(&dir)?;

        Ok(TemporaryRepository { repo, dir })
    }
}

impl RepositoryExt for Repository {}

/// A [`Repository`] in a temporary directory.
///
/// Because the backing directory for the repository will be deleted when this
/// struct is [`Drop`]ped, we don't provide any way to move the [`Repository`]
/// out, just deref to it.
#[must_use]
pub struct TemporaryRepository {
    repo: Repository,
    #[allow(unused)]
    dir: TempDir,
}

impl Debug for TemporaryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemporaryRepository {{ at {:?} }}", self.repo.path())
    }
}

impl Deref for TemporaryRepository {
    type Target = Repository;

    fn deref(&self) -> &Repository {
        &self.repo
    }
}

impl DerefMut for TemporaryRepository {
    fn deref_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }
}

impl Borrow<Repository> for TemporaryRepository {
    fn borrow(&self) -> &Repository {
        &self.repo
    }
}

impl RepositoryExt for TemporaryRepository {}

/// Extension methods for [`Oid`].
pub trait OidExt: Borrow<Oid> + Debug {
    /// Returns the SHA-1 digest Git would use as the ID of an object with
    /// this type and body: `<type> <len>\0<body>`.
    #[inline]
    #[must_use]
    fn digest_object(object_type: ObjectType, body: &[u8]) -> [u8; 20] {
        let digest: GenericArray<u8, U20> = ::sha1::Sha1::new()
            .chain_update(object_type.str())
            .chain_update(" ")
            .chain_update(body.len().to_string())
            .chain_update([0x00])
            .chain_update(body)
            .finalize();
        digest.into()
    }

    /// This is similar to [`Oid::hash_object`], but faster.
    ///
    /// # Errors
    ///
    /// Never in practice; [`Oid::from_bytes`] is fallible.
    fn for_object(object_type: ObjectType, body: &[u8]) -> Result<Oid> {
        let oid = Oid::from_bytes(&Oid::digest_object(object_type, body))?;
        if cfg!(debug_assertions) {
            // cross-check with git2
            let expected = Oid::hash_object(object_type, body)?;
            assert_eq!(expected, oid);
        }
        Ok(oid)
    }
}

impl OidExt for Oid {}
