use serde::{Deserialize, Serialize};

/// Structured comparison of two route sets.
///
/// Every sequence is sorted ascending. The counts are the sizes of the two
/// compared sets, so `old_count == unchanged.len() + removed.len()` and
/// `new_count == unchanged.len() + added.len()` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Comparison {
    /// Prefixes present in the new set only.
    #[serde(default)]
    pub added: Vec<String>,
    /// Prefixes present in the old set only.
    #[serde(default)]
    pub removed: Vec<String>,
    /// Prefixes present in both sets.
    #[serde(default)]
    pub unchanged: Vec<String>,
    /// Size of the old set.
    pub old_count: usize,
    /// Size of the new set.
    pub new_count: usize,
}

impl Comparison {
    /// Returns `true` when neither side gained or lost a prefix.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Change counts for tabular display.
    #[must_use]
    pub fn stats(&self) -> ComparisonStats {
        ComparisonStats {
            added: self.added.len(),
            removed: self.removed.len(),
            old_count: self.old_count,
            new_count: self.new_count,
        }
    }
}

/// Counts-only view of a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ComparisonStats {
    /// Number of added prefixes.
    pub added: usize,
    /// Number of removed prefixes.
    pub removed: usize,
    /// Size of the old set.
    pub old_count: usize,
    /// Size of the new set.
    pub new_count: usize,
}
