//! Built-in version-control backends.

mod git_cli;
mod no_history;
pub mod process;

pub use git_cli::{GitCliBackend, GIT_BIN_ENV};
pub use no_history::NoHistoryBackend;
pub use process::{CommandRunner, ProcessOutput, DEFAULT_TIMEOUT};
