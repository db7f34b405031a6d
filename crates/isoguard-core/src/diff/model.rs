//! Snapshot diff output types.

use serde::{Deserialize, Serialize};

/// Result of comparing a `before` and an `after` snapshot.
///
/// Path lists are sorted ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SnapshotDiff {
    /// Paths present in both snapshots whose content hash differs
    pub changed: Vec<String>,
    /// Paths present only in `after`
    pub added: Vec<String>,
    /// Paths present only in `before`
    pub removed: Vec<String>,
    /// Number of paths present in both with equal content hash
    pub unchanged: usize,
}

impl SnapshotDiff {
    /// True when nothing changed, appeared or disappeared.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// True when an existing artifact was modified or deleted.
    ///
    /// Added paths do not count: a later workload may create its own files.
    pub fn violates_isolation(&self) -> bool {
        !self.changed.is_empty() || !self.removed.is_empty()
    }

    /// Total number of distinct paths across both snapshots.
    pub fn total_paths(&self) -> usize {
        self.unchanged + self.changed.len() + self.added.len() + self.removed.len()
    }
}
