//! End-to-end processing of configuration files: generate, merge, diff.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{discover_configs, FilterConfig, FilterSection};
use crate::history::HistoryWalker;
use crate::merge::{merge_files, MERGED_FILE_NAME};
use crate::query::{artifact_path, RouteQuery};
use crate::report::{ConfigReport, ReportAccumulator, SectionReport, SectionStatus};
use crate::repository::display_path;
use crate::revisions::DEFAULT_REVISION_COUNT;
use crate::{Error, Result};

/// Name of the per-config directory holding section artifacts.
pub const FILTERS_DIR_NAME: &str = "filters";

/// Run-time settings of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Root under which `<config>/filters/` and the merged file are written.
    pub output_dir: PathBuf,
    /// Historical revisions compared per artifact.
    pub revision_count: usize,
    /// Query fresh artifacts; when `false` existing ones are reused.
    pub generate: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            revision_count: DEFAULT_REVISION_COUNT,
            generate: true,
        }
    }
}

/// Processes configuration files and records their reports.
#[derive(Debug)]
pub struct Pipeline {
    options: PipelineOptions,
    query: RouteQuery,
    walker: HistoryWalker,
}

impl Pipeline {
    /// Pipeline generating with `query` and diffing through `walker`.
    #[must_use]
    pub const fn new(options: PipelineOptions, query: RouteQuery, walker: HistoryWalker) -> Self {
        Self {
            options,
            query,
            walker,
        }
    }

    /// Output directory of the config named `config`.
    #[must_use]
    pub fn config_output_dir(&self, config: &str) -> PathBuf {
        self.options.output_dir.join(config)
    }

    /// Process every configuration file in `config_dir`.
    ///
    /// A config that fails to process is logged and skipped. Returns the
    /// number of configs processed successfully.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when `config_dir` cannot be listed.
    pub fn run(&self, config_dir: &Path, reports: &mut ReportAccumulator) -> Result<usize> {
        let configs = discover_configs(config_dir)?;
        if configs.is_empty() {
            log::warn!("no configuration files found in {}", config_dir.display());
        } else {
            log::info!("found {} configuration file(s)", configs.len());
        }

        let mut processed = 0;
        for config in &configs {
            match self.process(config, reports) {
                Ok(()) => processed += 1,
                Err(err) => log::error!("skipping {}: {err}", config.display()),
            }
        }
        Ok(processed)
    }

    /// Generate, merge and diff the artifacts of one configuration file,
    /// pushing its report onto `reports`.
    ///
    /// # Errors
    ///
    /// Returns an error when the config cannot be loaded or its output
    /// directory cannot be created. Failures of individual sections are
    /// recorded in the report instead.
    pub fn process(&self, config_path: &Path, reports: &mut ReportAccumulator) -> Result<()> {
        let config = FilterConfig::load(config_path)?;
        log::info!("processing {}", config.name);

        let output_dir = self.config_output_dir(&config.name);
        let filters_dir = output_dir.join(FILTERS_DIR_NAME);
        fs::create_dir_all(&filters_dir).map_err(|source| Error::Io {
            path: display_path(&filters_dir),
            source,
        })?;

        let mut report = ConfigReport::new(&config.name);
        let sections: Vec<_> = config.enabled_sections().collect();
        if sections.is_empty() {
            log::warn!("{} has no enabled sections", config.name);
            reports.push(report);
            return Ok(());
        }

        let mut artifacts = Vec::with_capacity(sections.len());
        for section in sections {
            let section_report = self.obtain_artifact(section, &filters_dir);
            if section_report.succeeded() {
                artifacts.push(section_report.artifact.clone());
            }
            report.push_section(section_report);
        }

        if artifacts.is_empty() {
            log::warn!("no artifacts available for {}; nothing to merge", config.name);
        } else {
            match merge_files(&artifacts, &output_dir.join(MERGED_FILE_NAME)) {
                Ok(merged) => report.merged_artifact = Some(merged),
                Err(err) => log::error!("failed to merge artifacts of {}: {err}", config.name),
            }
        }

        let count = self.options.revision_count;
        for section in &mut report.sections {
            if section.succeeded() {
                section.history = self.walker.build_history(&section.artifact, count);
            }
        }
        if let Some(merged) = &report.merged_artifact {
            report.merged_history = self.walker.build_history(merged, count);
        }

        log::info!(
            "{}: {} of {} section(s) succeeded",
            config.name,
            report.succeeded,
            report.total
        );
        reports.push(report);
        Ok(())
    }

    fn obtain_artifact(&self, section: &FilterSection, filters_dir: &Path) -> SectionReport {
        let artifact = artifact_path(filters_dir, &section.name);
        let status = if self.options.generate {
            match self.query.generate(section, filters_dir) {
                Ok(_) => SectionStatus::Generated,
                Err(err) => {
                    log::error!("{err}");
                    SectionStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            }
        } else if artifact.is_file() {
            SectionStatus::Reused
        } else {
            log::warn!(
                "{} has no existing artifact at {}",
                section.name,
                artifact.display()
            );
            SectionStatus::Failed {
                reason: format!("no existing artifact at {}", artifact.display()),
            }
        };

        SectionReport {
            name: section.name.clone(),
            source: section.from.clone(),
            artifact,
            status,
            history: Vec::new(),
        }
    }
}
