//! Route-set comparison.

use routewatch_api::Comparison;

use crate::routes::RouteSet;

/// Entry point for route-set comparisons.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

impl DiffEngine {
    /// Construct a new diff engine instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse both texts and compare the resulting route sets.
    ///
    /// Only set membership matters; line order and duplicate lines in either
    /// text have no effect on the result.
    #[must_use]
    pub fn compare(&self, old_text: &str, new_text: &str) -> Comparison {
        self.compare_sets(&RouteSet::parse(old_text), &RouteSet::parse(new_text))
    }

    /// Compare two already-parsed route sets.
    #[must_use]
    pub fn compare_sets(&self, old: &RouteSet, new: &RouteSet) -> Comparison {
        Comparison {
            added: new.difference(old),
            removed: old.difference(new),
            unchanged: old.intersection(new),
            old_count: old.len(),
            new_count: new.len(),
        }
    }
}
