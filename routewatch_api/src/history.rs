use serde::{Deserialize, Serialize};

use super::diff::Comparison;
use super::repository::RevisionInfo;

/// Marker for the working-tree state of an artifact that differs from (or
/// has not yet been checked against) its last committed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChanges {
    /// Unix timestamp (seconds) at which the working tree was read.
    pub observed_at: i64,
    /// Label shown in place of an author.
    pub author: String,
    /// Human-readable description of the entry.
    pub message: String,
}

impl LocalChanges {
    /// Identifier shown in place of a revision id.
    pub const ID: &'static str = "local";
    /// Default author label.
    pub const AUTHOR: &'static str = "Local (uncommitted)";
    /// Default description.
    pub const MESSAGE: &'static str = "Working tree compared with the last committed version";

    /// Marker observed at the given time with the default labels.
    #[must_use]
    pub fn observed_at(observed_at: i64) -> Self {
        Self {
            observed_at,
            author: Self::AUTHOR.to_owned(),
            message: Self::MESSAGE.to_owned(),
        }
    }
}

/// Revision side of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryRevision {
    /// Uncommitted working-tree state.
    LocalChanges(LocalChanges),
    /// A real revision reported by the version-control backend.
    Commit(RevisionInfo),
}

impl HistoryRevision {
    /// Identifier for display: the commit id or [`LocalChanges::ID`].
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::LocalChanges(_) => LocalChanges::ID,
            Self::Commit(info) => &info.id,
        }
    }

    /// Abbreviated identifier for display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        match self {
            Self::LocalChanges(_) => LocalChanges::ID,
            Self::Commit(info) => info.short_id(),
        }
    }

    /// Unix timestamp (seconds) associated with the entry.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::LocalChanges(local) => local.observed_at,
            Self::Commit(info) => info.timestamp,
        }
    }

    /// Author (or local label) associated with the entry.
    #[must_use]
    pub fn author(&self) -> &str {
        match self {
            Self::LocalChanges(local) => &local.author,
            Self::Commit(info) => &info.author,
        }
    }

    /// Message associated with the entry.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::LocalChanges(local) => &local.message,
            Self::Commit(info) => &info.message,
        }
    }

    /// Whether this is the synthetic working-tree entry.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::LocalChanges(_))
    }

    /// The underlying commit, if this is a real revision.
    #[must_use]
    pub const fn commit(&self) -> Option<&RevisionInfo> {
        match self {
            Self::LocalChanges(_) => None,
            Self::Commit(info) => Some(info),
        }
    }
}

/// One step of an artifact's history: a revision and how the current route
/// set compares against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Revision the current content was compared against.
    pub revision: HistoryRevision,
    /// Revision (old) versus current (new) comparison.
    pub comparison: Comparison,
}
