mod types;

use std::path::Path;

use routewatch_api::RevisionInfo;

pub use types::{BackendError, BackendResult, RevisionSpec};

/// Trait implemented by version-control integrations (e.g., the `git` CLI).
///
/// Paths handed to [`RevisionBackend::log`] and [`RevisionBackend::show`] are
/// relative to [`RevisionBackend::workdir`] and use `/` separators. Backends
/// are driven from a single thread and need not be `Sync`.
pub trait RevisionBackend {
    /// Stable identifier used for lookup and logging.
    fn id(&self) -> &'static str;

    /// Human-friendly label for reports.
    fn label(&self) -> &'static str;

    /// Root of the working tree, or `None` when no repository is available.
    fn workdir(&self) -> Option<&Path>;

    /// List up to `count` revisions that modified `path`, newest first.
    ///
    /// # Errors
    ///
    /// Implementors should surface any invocation or backend failures.
    fn log(&self, path: &str, count: usize) -> BackendResult<Vec<RevisionInfo>>;

    /// Read the content of `path` as of `revision`.
    ///
    /// Returns `Ok(None)` when the path does not exist at that revision.
    ///
    /// # Errors
    ///
    /// Implementors should surface any invocation or backend failures.
    fn show(&self, path: &str, revision: &RevisionSpec) -> BackendResult<Option<String>>;
}
