//! Timeout-bounded subprocess execution shared by every CLI-backed integration.

use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use routewatch_backend_api::{BackendError, BackendResult};
use wait_timeout::ChildExt;

/// Default limit applied to every external invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, or `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl ProcessOutput {
    /// Exit status for messages: the code, or `terminated`.
    #[must_use]
    pub fn status(&self) -> String {
        self.code
            .map_or_else(|| "terminated".to_string(), |code| code.to_string())
    }

    /// Convert an unsuccessful exit into [`BackendError::CommandFailed`].
    ///
    /// # Errors
    ///
    /// Returns the failure when the process did not exit successfully.
    pub fn into_success(self, program: &OsStr) -> BackendResult<Self> {
        if self.success {
            return Ok(self);
        }
        Err(BackendError::CommandFailed {
            program: program.to_string_lossy().into_owned(),
            status: self.status(),
            stderr: self.stderr.trim().to_owned(),
        })
    }
}

/// Runs external commands, killing any that exceed the configured timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    /// Runner with the given per-invocation limit.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` with `args`, optionally inside `cwd`.
    ///
    /// A non-zero exit is not an error here; callers decide what it means.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Spawn`] when the program cannot be started,
    /// [`BackendError::Timeout`] when it exceeds the limit, and
    /// [`BackendError::Failure`] when waiting on it or collecting its output
    /// fails.
    pub fn run<S>(
        &self,
        program: &OsStr,
        args: &[S],
        cwd: Option<&Path>,
    ) -> BackendResult<ProcessOutput>
    where
        S: AsRef<OsStr>,
    {
        let display = program.to_string_lossy().into_owned();
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        log::debug!("running {}", render_command(program, args));

        let mut child = command.spawn().map_err(|source| BackendError::Spawn {
            program: display.clone(),
            source,
        })?;

        let stdout_handle = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stdout.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        let stderr_handle = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stderr.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::Timeout {
                    program: display,
                    timeout: self.timeout,
                });
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::message(format!(
                    "failed waiting on {display}: {err}"
                )));
            }
        };

        let stdout = join_reader(stdout_handle, &display, "stdout")?;
        let stderr = join_reader(stderr_handle, &display, "stderr")?;

        Ok(ProcessOutput {
            success: status.success(),
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    program: &str,
    stream: &str,
) -> BackendResult<String> {
    match handle {
        Some(handle) => {
            let bytes = handle
                .join()
                .map_err(|_| {
                    BackendError::message(format!("failed to join {program} {stream} reader"))
                })?
                .map_err(|err| {
                    BackendError::message(format!("failed to read {program} {stream}: {err}"))
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => Ok(String::new()),
    }
}

fn render_command<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut parts: Vec<OsString> = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_owned());
    parts.extend(args.iter().map(|arg| arg.as_ref().to_owned()));
    parts
        .iter()
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
