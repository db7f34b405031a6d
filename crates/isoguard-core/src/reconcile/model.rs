//! Reconciliation output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Comparison of one key present in both datasets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationRecord {
    pub key: String,
    pub reference: BTreeSet<String>,
    pub candidate: BTreeSet<String>,
    /// In the reference but not the candidate
    pub missing: BTreeSet<String>,
    /// In the candidate but not the reference
    pub extra: BTreeSet<String>,
    /// `|symmetric difference| / |union| * 100`, rounded to two decimals;
    /// `None` when both sets are empty
    pub percent_difference: Option<f64>,
}

impl ReconciliationRecord {
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Full result of reconciling a reference dataset against a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationReport {
    pub reference_label: String,
    pub candidate_label: String,
    /// One record per shared key, ascending key order
    pub records: Vec<ReconciliationRecord>,
    pub reference_only_keys: Vec<String>,
    pub candidate_only_keys: Vec<String>,
}

impl ReconciliationReport {
    /// Records whose member sets differ.
    pub fn mismatches(&self) -> impl Iterator<Item = &ReconciliationRecord> {
        self.records.iter().filter(|r| !r.is_match())
    }

    pub fn shared_count(&self) -> usize {
        self.records.len()
    }

    pub fn matching_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_match()).count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.shared_count() - self.matching_count()
    }

    /// Mismatching keys as a percentage of shared keys; `None` when no key is shared.
    pub fn mismatch_percentage(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        Some(round2(
            self.mismatch_count() as f64 / self.shared_count() as f64 * 100.0,
        ))
    }

    /// One-line human summary of the run.
    pub fn summary_line(&self) -> String {
        let pct = self
            .mismatch_percentage()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "Total Same Keys: {}, Total Mismatched Keys: {}, Percentage: {}",
            self.shared_count(),
            self.mismatch_count(),
            pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(50.0), 50.0);
    }

    #[test]
    fn test_summary_line_without_shared_keys() {
        let report = ReconciliationReport {
            reference_label: "a".into(),
            candidate_label: "b".into(),
            records: vec![],
            reference_only_keys: vec!["k".into()],
            candidate_only_keys: vec![],
        };
        assert_eq!(report.mismatch_percentage(), None);
        assert!(report.summary_line().ends_with("Percentage: N/A"));
    }
}
