//! Prefix-list generation through an external route-query tool (`bgpq4`).

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use routewatch_backends::CommandRunner;

use crate::config::FilterSection;
use crate::repository::display_path;
use crate::{Error, Result};

/// Default route-query binary.
pub const DEFAULT_QUERY_BIN: &str = "bgpq4";

/// File extension of generated artifacts.
pub const ARTIFACT_EXTENSION: &str = "conf";

/// Path of the artifact generated for `section` inside `filters_dir`.
#[must_use]
pub fn artifact_path(filters_dir: &Path, section: &str) -> PathBuf {
    filters_dir.join(format!("{section}.{ARTIFACT_EXTENSION}"))
}

/// Invokes the route-query tool once per section.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    binary: OsString,
    runner: CommandRunner,
}

impl RouteQuery {
    /// Query tool at `binary`, bounding each invocation by `timeout`.
    pub fn new(binary: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            runner: CommandRunner::new(timeout),
        }
    }

    /// Arguments producing a BIRD-format list named after the section.
    #[must_use]
    pub fn arguments(section: &FilterSection) -> Vec<String> {
        let mut args = Vec::with_capacity(5);
        if section.ipv6 {
            args.push("-6".to_owned());
        }
        args.push("-b".to_owned());
        args.push("-l".to_owned());
        args.push(format!("define {}", section.name));
        args.push(section.from.clone());
        args
    }

    /// Generate the artifact for `section` into `filters_dir` and return its
    /// path. The artifact is left untouched when the query fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the tool cannot be started, times out or
    /// exits unsuccessfully, and [`Error::Io`] when the artifact cannot be
    /// written.
    pub fn generate(&self, section: &FilterSection, filters_dir: &Path) -> Result<PathBuf> {
        let query_error = |source| Error::Query {
            section: section.name.clone(),
            source,
        };

        let args = Self::arguments(section);
        log::info!(
            "querying {} for {} ({})",
            section.from,
            section.name,
            if section.ipv6 { "IPv6" } else { "IPv4" }
        );

        let output = self
            .runner
            .run(&self.binary, &args, None)
            .and_then(|output| output.into_success(&self.binary))
            .map_err(query_error)?;

        fs::create_dir_all(filters_dir).map_err(|source| Error::Io {
            path: display_path(filters_dir),
            source,
        })?;
        let path = artifact_path(filters_dir, &section.name);
        fs::write(&path, output.stdout).map_err(|source| Error::Io {
            path: display_path(&path),
            source,
        })?;

        log::info!("saved {}", path.display());
        Ok(path)
    }
}

impl Default for RouteQuery {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_BIN, routewatch_backends::DEFAULT_TIMEOUT)
    }
}
