use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use routewatch_api::RevisionInfo;
use routewatch_backend_api::{BackendError, BackendResult, RevisionBackend, RevisionSpec};

use crate::process::{CommandRunner, ProcessOutput};

/// Environment variable overriding the `git` binary.
pub const GIT_BIN_ENV: &str = "ROUTEWATCH_GIT_BIN";

const FIELD_SEPARATOR: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%at%x1f%an%x1f%s";

/// Backend that shells out to the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCliBackend {
    binary: OsString,
    root: PathBuf,
    runner: CommandRunner,
}

impl GitCliBackend {
    /// Discover the repository containing `start` using the default binary
    /// (`git`, or the value of [`GIT_BIN_ENV`]).
    ///
    /// # Errors
    ///
    /// Returns an error when `git` cannot be run, times out, or `start` is not
    /// inside a working tree.
    pub fn discover(start: impl AsRef<Path>, timeout: Duration) -> BackendResult<Self> {
        let binary = env::var_os(GIT_BIN_ENV).unwrap_or_else(|| OsString::from("git"));
        Self::discover_with_binary(binary, start, timeout)
    }

    /// Discover the repository containing `start` with an explicit binary.
    ///
    /// # Errors
    ///
    /// See [`GitCliBackend::discover`].
    pub fn discover_with_binary(
        binary: impl Into<OsString>,
        start: impl AsRef<Path>,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let binary = binary.into();
        let runner = CommandRunner::new(timeout);
        let start = start.as_ref();
        let output = runner
            .run(
                &binary,
                &[
                    OsStr::new("-C"),
                    start.as_os_str(),
                    OsStr::new("rev-parse"),
                    OsStr::new("--show-toplevel"),
                ],
                None,
            )?
            .into_success(&binary)?;

        let toplevel = output.stdout.trim();
        if toplevel.is_empty() {
            return Err(BackendError::unavailable(format!(
                "{} has no working tree",
                start.display()
            )));
        }

        Ok(Self {
            binary,
            root: PathBuf::from(toplevel),
            runner,
        })
    }

    fn git<S: AsRef<OsStr>>(&self, args: &[S]) -> BackendResult<ProcessOutput> {
        let mut full: Vec<&OsStr> = Vec::with_capacity(args.len() + 3);
        full.push(OsStr::new("-C"));
        full.push(self.root.as_os_str());
        full.push(OsStr::new("--no-pager"));
        full.extend(args.iter().map(|arg| AsRef::<OsStr>::as_ref(arg)));
        self.runner.run(&self.binary, &full, None)
    }
}

impl RevisionBackend for GitCliBackend {
    fn id(&self) -> &'static str {
        "git"
    }

    fn label(&self) -> &'static str {
        "git command line"
    }

    fn workdir(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn log(&self, path: &str, count: usize) -> BackendResult<Vec<RevisionInfo>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let limit = format!("-{count}");
        let output = self
            .git(&["log", limit.as_str(), LOG_FORMAT, "--", path])?
            .into_success(&self.binary)?;
        Ok(parse_log(&output.stdout))
    }

    fn show(&self, path: &str, revision: &RevisionSpec) -> BackendResult<Option<String>> {
        let object = format!("{}:{path}", revision.as_git_rev());
        let output = self.git(&["show", object.as_str()])?;
        if output.success {
            Ok(Some(output.stdout))
        } else {
            log::debug!("{object} is not available: {}", output.stderr.trim());
            Ok(None)
        }
    }
}

fn parse_log(output: &str) -> Vec<RevisionInfo> {
    output.lines().filter_map(parse_log_line).collect()
}

fn parse_log_line(line: &str) -> Option<RevisionInfo> {
    let mut fields = line.splitn(4, FIELD_SEPARATOR);
    let id = fields.next()?.trim();
    let timestamp = fields.next()?.trim().parse().ok()?;
    let author = fields.next()?;
    let message = fields.next()?;
    if id.is_empty() {
        return None;
    }
    Some(RevisionInfo::new(id, timestamp, author, message))
}
