//! Report accumulation and rendering.
//!
//! Reports are collected for every processed config and rendered once at the
//! end of a run, either as a plain-text summary or as JSON files.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use routewatch_api::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::merge::MERGED_FILE_NAME;
use crate::repository::display_path;
use crate::{Error, Result};

/// File name of the run-level JSON index.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Subdirectory of the report directory holding per-config reports.
pub const CONFIG_REPORTS_DIR: &str = "configs";

const NO_HISTORY: &str = "no history available";

/// How a section's artifact was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionStatus {
    /// Freshly generated by the route-query tool.
    Generated,
    /// An existing artifact was reused without querying.
    Reused,
    /// No artifact is available for the section.
    Failed {
        /// Why the section has no artifact.
        reason: String,
    },
}

/// Outcome and history of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReport {
    /// Section name.
    pub name: String,
    /// AS number or AS-SET the prefixes were queried from.
    pub source: String,
    /// Location of the section's artifact.
    pub artifact: PathBuf,
    /// How the artifact was obtained.
    #[serde(flatten)]
    pub status: SectionStatus,
    /// Comparisons against earlier versions, newest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl SectionReport {
    /// Whether an artifact is available for the section.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self.status, SectionStatus::Failed { .. })
    }
}

/// Everything produced for one configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigReport {
    /// Config name (file stem).
    pub name: String,
    /// Unix timestamp (seconds) of the run.
    pub generated_at: i64,
    /// Number of enabled sections.
    pub total: usize,
    /// Sections with an artifact.
    pub succeeded: usize,
    /// Sections without an artifact.
    pub failed: usize,
    /// Per-section results in config order.
    pub sections: Vec<SectionReport>,
    /// Location of the merged artifact, when one was written.
    pub merged_artifact: Option<PathBuf>,
    /// History of the merged artifact.
    #[serde(default)]
    pub merged_history: Vec<HistoryEntry>,
}

impl ConfigReport {
    /// Empty report stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generated_at: Utc::now().timestamp(),
            total: 0,
            succeeded: 0,
            failed: 0,
            sections: Vec::new(),
            merged_artifact: None,
            merged_history: Vec::new(),
        }
    }

    /// Record a section, updating the counters.
    pub fn push_section(&mut self, section: SectionReport) {
        self.total += 1;
        if section.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.sections.push(section);
    }

    /// Location of this report relative to the report directory.
    fn json_file_name(&self) -> String {
        format!("{CONFIG_REPORTS_DIR}/{}.json", self.name)
    }
}

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    name: &'a str,
    generated_at: i64,
    total: usize,
    succeeded: usize,
    failed: usize,
    report: String,
}

/// Collects [`ConfigReport`]s over a run.
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    reports: Vec<ConfigReport>,
}

impl ReportAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports: Vec::new(),
        }
    }

    /// Add the report of one processed config.
    pub fn push(&mut self, report: ConfigReport) {
        self.reports.push(report);
    }

    /// Reports in processing order.
    #[must_use]
    pub fn reports(&self) -> &[ConfigReport] {
        &self.reports
    }

    /// Whether no config has been processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Plain-text table of the latest comparison of every artifact.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for report in &self.reports {
            let _ = writeln!(
                out,
                "{} ({})  {} section(s): {} ok, {} failed",
                report.name,
                format_timestamp(report.generated_at),
                report.total,
                report.succeeded,
                report.failed
            );

            for section in &report.sections {
                let detail = match &section.status {
                    SectionStatus::Failed { reason } => format!("failed: {reason}"),
                    _ => latest_change(&section.history),
                };
                let _ = writeln!(out, "  {:<40} {detail}", section.name);
            }

            if report.merged_artifact.is_some() {
                let _ = writeln!(
                    out,
                    "  {:<40} {}",
                    MERGED_FILE_NAME,
                    latest_change(&report.merged_history)
                );
            }
        }
        out
    }

    /// Write `index.json` into `dir` and one `configs/<config>.json` per
    /// report, returning the paths written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when `dir` or a file cannot be written and
    /// [`Error::Report`] when serialization fails.
    pub fn write_json(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let configs_dir = dir.join(CONFIG_REPORTS_DIR);
        fs::create_dir_all(&configs_dir).map_err(|source| Error::Io {
            path: display_path(&configs_dir),
            source,
        })?;

        let mut written = Vec::with_capacity(self.reports.len() + 1);
        let mut index = Vec::with_capacity(self.reports.len());
        for report in &self.reports {
            let file_name = report.json_file_name();
            written.push(write_pretty(&dir.join(&file_name), report)?);
            index.push(IndexEntry {
                name: &report.name,
                generated_at: report.generated_at,
                total: report.total,
                succeeded: report.succeeded,
                failed: report.failed,
                report: file_name,
            });
        }
        written.push(write_pretty(&dir.join(INDEX_FILE_NAME), &index)?);

        Ok(written)
    }
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value).map_err(|source| Error::Report {
        path: display_path(path),
        source,
    })?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: display_path(path),
        source,
    })?;
    Ok(path.to_path_buf())
}

fn latest_change(history: &[HistoryEntry]) -> String {
    history.first().map_or_else(
        || NO_HISTORY.to_owned(),
        |entry| {
            let stats = entry.comparison.stats();
            format!(
                "{:<8} {} → {}  +{}  -{}",
                entry.revision.short_id(),
                stats.old_count,
                stats.new_count,
                stats.added,
                stats.removed
            )
        },
    )
}

/// Render a Unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
#[must_use]
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map_or_else(
        || timestamp.to_string(),
        |time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
