use std::path::Path;

use routewatch_api::RevisionInfo;
use routewatch_backend_api::{BackendResult, RevisionBackend, RevisionSpec};

/// Builtin backend for deployments without version control.
///
/// Every query succeeds with no data, so histories contain nothing to compare.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistoryBackend;

impl RevisionBackend for NoHistoryBackend {
    fn id(&self) -> &'static str {
        "none"
    }

    fn label(&self) -> &'static str {
        "No version control"
    }

    fn workdir(&self) -> Option<&Path> {
        None
    }

    fn log(&self, _path: &str, _count: usize) -> BackendResult<Vec<RevisionInfo>> {
        Ok(Vec::new())
    }

    fn show(&self, _path: &str, _revision: &RevisionSpec) -> BackendResult<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_query_is_empty() {
        let backend = NoHistoryBackend;
        assert!(backend.workdir().is_none());
        assert!(backend.log("filters/A.conf", 5).expect("log").is_empty());
        assert!(backend
            .show("filters/A.conf", &RevisionSpec::Committed)
            .expect("show")
            .is_none());
    }
}
