//! In-process repository access built on top of libgit2.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{
    Commit, ErrorClass, ErrorCode, ObjectType, Oid, Repository as GitRepository, Sort,
};
use routewatch_api::RevisionInfo;
use routewatch_backend_api::{BackendError, BackendResult, RevisionBackend, RevisionSpec};

use crate::{Error, Result};

/// Lightweight handle to the repository holding generated artifacts.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open a repository from the given filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, does not resolve
    /// to a git repository, or if libgit2 reports an unsupported repository
    /// layout (such as a bare repository).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository {
                path: display_path(&canonical),
            })?;

        Ok(Self { inner: repo, root })
    }

    /// Returns the absolute path to the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Revisions that modified `path`, newest first, at most `count`.
    ///
    /// A commit modifies a path when the blob recorded at that path differs
    /// from the blob in every parent (or the commit has no parent and the
    /// path exists).
    ///
    /// # Errors
    ///
    /// Propagates libgit2 failures while walking history.
    pub fn revisions_touching(&self, path: &str, count: usize) -> Result<Vec<RevisionInfo>> {
        let mut revisions = Vec::new();
        if count == 0 || self.head_commit()?.is_none() {
            return Ok(revisions);
        }

        let mut walk = self.inner.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push_head()?;

        for oid in walk {
            let commit = self.inner.find_commit(oid?)?;
            if self.modifies(&commit, path)? {
                revisions.push(commit_to_revision(&commit));
                if revisions.len() == count {
                    break;
                }
            }
        }

        Ok(revisions)
    }

    /// Content of `path` at `revision`, or `None` when it does not exist there.
    ///
    /// # Errors
    ///
    /// Propagates libgit2 failures other than a missing path or unborn HEAD.
    pub fn read_blob(&self, path: &str, revision: &RevisionSpec) -> Result<Option<String>> {
        let commit = match revision {
            RevisionSpec::Committed => match self.head_commit()? {
                Some(commit) => commit,
                None => return Ok(None),
            },
            RevisionSpec::Id(id) => match self.inner.revparse_single(id) {
                Ok(object) => object.peel_to_commit()?,
                Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
                Err(err) => return Err(Error::from(err)),
            },
        };

        let Some(oid) = blob_at(&commit, path)? else {
            return Ok(None);
        };
        let blob = self.inner.find_blob(oid)?;
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn modifies(&self, commit: &Commit<'_>, path: &str) -> Result<bool> {
        let current = blob_at(commit, path)?;
        if commit.parent_count() == 0 {
            return Ok(current.is_some());
        }

        for parent in commit.parents() {
            if blob_at(&parent, path)? == current {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        let head = match self.inner.head() {
            Ok(head) => head,
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        ErrorClass::Reference,
                        ErrorCode::NotFound | ErrorCode::UnbornBranch
                    )
                ) =>
            {
                return Ok(None)
            }
            Err(err) => return Err(Error::from(err)),
        };

        Ok(Some(head.resolve()?.peel_to_commit()?))
    }
}

impl RevisionBackend for Repository {
    fn id(&self) -> &'static str {
        "libgit2"
    }

    fn label(&self) -> &'static str {
        "libgit2 (in-process)"
    }

    fn workdir(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn log(&self, path: &str, count: usize) -> BackendResult<Vec<RevisionInfo>> {
        self.revisions_touching(path, count).map_err(into_backend)
    }

    fn show(&self, path: &str, revision: &RevisionSpec) -> BackendResult<Option<String>> {
        self.read_blob(path, revision).map_err(into_backend)
    }
}

fn blob_at(commit: &Commit<'_>, path: &str) -> Result<Option<Oid>> {
    let tree = commit.tree()?;
    match tree.get_path(Path::new(path)) {
        Ok(entry) if entry.kind() == Some(ObjectType::Blob) => Ok(Some(entry.id())),
        Ok(_) => Ok(None),
        Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
        Err(err) => Err(Error::from(err)),
    }
}

fn commit_to_revision(commit: &Commit<'_>) -> RevisionInfo {
    let author = commit.author();
    RevisionInfo {
        id: commit.id().to_string(),
        timestamp: commit.time().seconds(),
        author: author.name().unwrap_or_default().to_owned(),
        message: commit.summary().unwrap_or_default().to_owned(),
    }
}

fn into_backend(error: Error) -> BackendError {
    BackendError::message(error.to_string())
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
