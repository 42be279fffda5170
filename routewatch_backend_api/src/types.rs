use std::fmt;
use std::time::Duration;

/// Revision selector understood by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevisionSpec {
    /// The most recent committed version (`HEAD` for git), as opposed to the
    /// working tree.
    Committed,
    /// An explicit revision identifier.
    Id(String),
}

impl RevisionSpec {
    /// Selector for an explicit revision id.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Textual form accepted by git: `HEAD` or the id itself.
    #[must_use]
    pub fn as_git_rev(&self) -> &str {
        match self {
            Self::Committed => "HEAD",
            Self::Id(id) => id,
        }
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_git_rev())
    }
}

/// Errors surfaced by version-control backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// No repository or backend is available for the request.
    #[error("version control is unavailable: {reason}")]
    Unavailable {
        /// Why the backend cannot serve the request.
        reason: String,
    },
    /// The backend process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The backend process did not finish in time and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// Program that timed out.
        program: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },
    /// The backend process exited unsuccessfully.
    #[error("{program} failed with status {status}: {stderr}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit code, or `terminated` when killed by a signal.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// Generic failure surfaced by the backend.
    #[error("{message}")]
    Failure {
        /// Human-readable error message.
        message: String,
    },
}

impl BackendError {
    /// Helper to construct a failure from any displayable message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Helper to construct an [`BackendError::Unavailable`] error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Convenience result alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
