use serde::{Deserialize, Serialize};

/// Number of characters shown when a revision id is abbreviated.
pub const SHORT_ID_LEN: usize = 8;

/// Identity of a revision that touched an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    /// Full object identifier (e.g., git SHA).
    pub id: String,
    /// Unix timestamp (seconds) of the revision.
    pub timestamp: i64,
    /// Author display name.
    pub author: String,
    /// Summary line of the revision message.
    #[serde(default)]
    pub message: String,
}

impl RevisionInfo {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        timestamp: i64,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            author: author.into(),
            message: message.into(),
        }
    }

    /// Abbreviated identifier for display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map_or(self.id.as_str(), |(end, _)| &self.id[..end])
    }
}
