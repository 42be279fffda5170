//! Per-artifact change history.

use std::path::Path;

use chrono::Utc;
use routewatch_api::{HistoryEntry, HistoryRevision, LocalChanges};
use routewatch_backend_api::RevisionSpec;

use crate::diff::DiffEngine;
use crate::revisions::RevisionReader;
use crate::routes::RouteSet;

/// Builds the ordered comparison history of a single artifact.
#[derive(Debug)]
pub struct HistoryWalker {
    reader: RevisionReader,
    engine: DiffEngine,
}

impl HistoryWalker {
    /// Walker reading snapshots through `reader`.
    #[must_use]
    pub const fn new(reader: RevisionReader) -> Self {
        Self {
            reader,
            engine: DiffEngine::new(),
        }
    }

    /// Compare the current content of `artifact_path` with its last committed
    /// version and with up to `revision_count` earlier revisions.
    ///
    /// The result starts with a [`LocalChanges`] entry when a committed
    /// version exists, followed by real revisions newest first. A missing or
    /// unreadable artifact yields an empty history.
    #[must_use]
    pub fn build_history(&self, artifact_path: &Path, revision_count: usize) -> Vec<HistoryEntry> {
        if !artifact_path.exists() {
            log::warn!(
                "{} does not exist; no history to build",
                artifact_path.display()
            );
            return Vec::new();
        }

        let current = match self.reader.read_current(artifact_path) {
            Ok(text) => RouteSet::parse(&text),
            Err(err) => {
                log::error!("skipping history for {}: {err}", artifact_path.display());
                return Vec::new();
            }
        };

        let mut history = Vec::new();

        if let Some(committed) = self
            .reader
            .read_at_revision(artifact_path, &RevisionSpec::Committed)
        {
            history.push(HistoryEntry {
                revision: HistoryRevision::LocalChanges(LocalChanges::observed_at(
                    Utc::now().timestamp(),
                )),
                comparison: self
                    .engine
                    .compare_sets(&RouteSet::parse(&committed), &current),
            });
        }

        for info in self
            .reader
            .list_recent_revisions(artifact_path, revision_count)
        {
            let Some(text) = self
                .reader
                .read_at_revision(artifact_path, &RevisionSpec::id(&info.id))
            else {
                log::debug!(
                    "{} is not readable at {}; skipping",
                    artifact_path.display(),
                    info.short_id()
                );
                continue;
            };

            history.push(HistoryEntry {
                comparison: self.engine.compare_sets(&RouteSet::parse(&text), &current),
                revision: HistoryRevision::Commit(info),
            });
        }

        history
    }
}
