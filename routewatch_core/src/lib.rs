//! Core library for routewatch's prefix-filter change tracking.
//!
//! The crate is layered around three primary responsibilities:
//! - route-set extraction and comparison ([`routes`], [`diff`])
//! - artifact history from version control ([`revisions`], [`history`], [`repository`])
//! - the generation pipeline that feeds it ([`config`], [`query`], [`merge`], [`pipeline`],
//!   [`report`])

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Filter configuration files.
pub mod config;
/// Route-set comparison.
pub mod diff;
/// Per-artifact change history.
pub mod history;
/// Concatenation of generated artifacts.
pub mod merge;
/// End-to-end processing of one configuration file.
pub mod pipeline;
/// Route-query tool invocation.
pub mod query;
/// Report accumulation and rendering.
pub mod report;
/// In-process git access.
pub mod repository;
/// Snapshot retrieval for artifacts.
pub mod revisions;
/// Route-set extraction.
pub mod routes;

pub use routewatch_api::{
    Comparison, ComparisonStats, HistoryEntry, HistoryRevision, LocalChanges, RevisionInfo,
};
pub use routewatch_backend_api::{BackendError, RevisionBackend, RevisionSpec};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Bare repositories are unsupported.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// A configuration file is not valid TOML.
    #[error("invalid configuration {path}: {source}")]
    Config {
        /// Configuration file being parsed.
        path: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },
    /// A revision backend could not be set up.
    #[error("{backend} backend unavailable: {source}")]
    Backend {
        /// Identifier of the requested backend.
        backend: String,
        /// Backend failure.
        #[source]
        source: routewatch_backend_api::BackendError,
    },
    /// The route-query tool failed for a section.
    #[error("route query for {section} failed: {source}")]
    Query {
        /// Section whose artifact could not be generated.
        section: String,
        /// Invocation failure.
        #[source]
        source: routewatch_backend_api::BackendError,
    },
    /// A JSON report could not be written.
    #[error("failed to serialize report {path}: {source}")]
    Report {
        /// Report file being written.
        path: String,
        /// Serializer error.
        #[source]
        source: serde_json::Error,
    },
}
