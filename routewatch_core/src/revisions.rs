//! Snapshot retrieval for artifacts: historical revisions through a
//! [`RevisionBackend`], current content straight from disk.
//!
//! Backend failures are expected (new files, deployments outside a
//! repository, a missing `git` binary) and are reported as "no data" after a
//! warning rather than as errors.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use routewatch_api::RevisionInfo;
use routewatch_backend_api::{RevisionBackend, RevisionSpec};
use routewatch_backends::{GitCliBackend, NoHistoryBackend};

use crate::repository::{display_path, Repository};
use crate::{Error, Result};

/// Default number of historical revisions compared per artifact.
pub const DEFAULT_REVISION_COUNT: usize = 5;

/// Version-control backends selectable at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// The `git` command line.
    #[default]
    Git,
    /// In-process libgit2.
    Libgit2,
    /// No version control.
    None,
}

impl BackendKind {
    /// Names accepted by [`BackendKind::from_str`].
    pub const NAMES: [&'static str; 3] = ["git", "libgit2", "none"];

    /// Open the backend for the repository containing `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when the `git` command line cannot find a
    /// repository, and the [`Repository::open`] errors for libgit2.
    pub fn open(self, start: &Path, timeout: Duration) -> Result<Box<dyn RevisionBackend>> {
        match self {
            Self::Git => GitCliBackend::discover(start, timeout)
                .map(|backend| Box::new(backend) as Box<dyn RevisionBackend>)
                .map_err(|source| Error::Backend {
                    backend: "git".to_owned(),
                    source,
                }),
            Self::Libgit2 => Ok(Box::new(Repository::open(start)?)),
            Self::None => Ok(Box::new(NoHistoryBackend)),
        }
    }

    /// Like [`BackendKind::open`], falling back to no version control after
    /// a warning.
    #[must_use]
    pub fn open_or_none(self, start: &Path, timeout: Duration) -> Box<dyn RevisionBackend> {
        match self.open(start, timeout) {
            Ok(backend) => {
                log::debug!("reading history through {}", backend.label());
                backend
            }
            Err(err) => {
                log::warn!("history is unavailable for {}: {err}", start.display());
                Box::new(NoHistoryBackend)
            }
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "git" => Ok(Self::Git),
            "libgit2" => Ok(Self::Libgit2),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown backend {other:?}; expected one of {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Reads artifact snapshots from version control and the filesystem.
pub struct RevisionReader {
    backend: Box<dyn RevisionBackend>,
    root: Option<PathBuf>,
}

impl RevisionReader {
    /// Reader backed by `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn RevisionBackend>) -> Self {
        let root = backend
            .workdir()
            .map(|dir| fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()));
        Self { backend, root }
    }

    /// `path` relative to the repository root with `/` separators, or `None`
    /// when there is no repository or the path lies outside of it.
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let root = self.root.as_deref()?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().ok()?.join(path)
        };
        let resolved = fs::canonicalize(&absolute).unwrap_or(absolute);
        let relative = resolved.strip_prefix(root).ok()?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::CurDir => {}
                _ => return None,
            }
        }

        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }

    /// Up to `count` revisions that modified `path`, newest first.
    ///
    /// Returns an empty list when history cannot be obtained for any reason.
    #[must_use]
    pub fn list_recent_revisions(&self, path: &Path, count: usize) -> Vec<RevisionInfo> {
        let Some(relative) = self.repository_path(path) else {
            return Vec::new();
        };

        match self.backend.log(&relative, count) {
            Ok(revisions) => revisions,
            Err(err) => {
                log::warn!(
                    "failed to list {} history for {relative}: {err}",
                    self.backend.id()
                );
                Vec::new()
            }
        }
    }

    /// Content of `path` as of `revision`, or `None` when the path did not
    /// exist there or the backend could not be queried.
    #[must_use]
    pub fn read_at_revision(&self, path: &Path, revision: &RevisionSpec) -> Option<String> {
        let relative = self.repository_path(path)?;

        match self.backend.show(&relative, revision) {
            Ok(content) => content,
            Err(err) => {
                log::warn!(
                    "failed to read {relative} at {revision} via {}: {err}",
                    self.backend.id()
                );
                None
            }
        }
    }

    /// Present on-disk content of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read.
    pub fn read_current(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| Error::Io {
            path: display_path(path),
            source,
        })
    }

    fn repository_path(&self, path: &Path) -> Option<String> {
        if self.root.is_none() {
            log::debug!(
                "{} has no repository; skipping history for {}",
                self.backend.id(),
                path.display()
            );
            return None;
        }

        let relative = self.relative_path(path);
        if relative.is_none() {
            log::warn!(
                "{} is outside the repository; skipping history",
                path.display()
            );
        }
        relative
    }
}

impl fmt::Debug for RevisionReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevisionReader")
            .field("backend", &self.backend.id())
            .field("root", &self.root)
            .finish()
    }
}
