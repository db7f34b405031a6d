//! Weighted reconciliation: compares per-member allocations instead of
//! bare membership.

use crate::dataset::WeightedDataset;
use crate::{log_op_end, log_op_start};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

/// One member whose weight differs between the two sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightDelta {
    pub member: String,
    /// `None` when the member is absent from the reference
    pub reference: Option<f64>,
    /// `None` when the member is absent from the candidate
    pub candidate: Option<f64>,
}

/// Shared key whose allocations disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightMismatch {
    pub key: String,
    pub deltas: Vec<WeightDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightReconciliationReport {
    pub reference_label: String,
    pub candidate_label: String,
    pub tolerance: f64,
    pub shared_keys: usize,
    /// Mismatching shared keys, ascending key order
    pub mismatches: Vec<WeightMismatch>,
    pub reference_only_keys: Vec<String>,
    pub candidate_only_keys: Vec<String>,
}

impl WeightReconciliationReport {
    pub fn summary_line(&self) -> String {
        let pct = if self.shared_keys == 0 {
            "N/A".to_string()
        } else {
            format!(
                "{:.2}",
                super::round2(self.mismatches.len() as f64 / self.shared_keys as f64 * 100.0)
            )
        };
        format!(
            "Total Same Keys: {}, Total Mismatched Keys: {}, Percentage: {}",
            self.shared_keys,
            self.mismatches.len(),
            pct
        )
    }
}

/// Compare allocations key by key.
///
/// A member differs when it is present on one side only, or when both
/// weights differ by more than `tolerance`.
pub fn reconcile_weights(
    reference: &WeightedDataset,
    candidate: &WeightedDataset,
    tolerance: f64,
) -> WeightReconciliationReport {
    let started = Instant::now();
    log_op_start!(
        "reconcile_weights",
        reference = reference.label(),
        candidate = candidate.label()
    );

    let mut shared_keys = 0;
    let mut mismatches = Vec::new();
    let mut reference_only_keys = Vec::new();

    for (key, ref_weights) in reference.entries() {
        let Some(cand_weights) = candidate.get(key) else {
            reference_only_keys.push(key.clone());
            continue;
        };
        shared_keys += 1;

        let members: BTreeSet<&String> = ref_weights.keys().chain(cand_weights.keys()).collect();
        let deltas: Vec<WeightDelta> = members
            .into_iter()
            .filter_map(|member| {
                let r = ref_weights.get(member).copied();
                let c = cand_weights.get(member).copied();
                let differs = match (r, c) {
                    (Some(r), Some(c)) => (r - c).abs() > tolerance,
                    _ => true,
                };
                differs.then(|| WeightDelta {
                    member: member.clone(),
                    reference: r,
                    candidate: c,
                })
            })
            .collect();

        if !deltas.is_empty() {
            mismatches.push(WeightMismatch {
                key: key.clone(),
                deltas,
            });
        }
    }

    let candidate_only_keys = candidate
        .entries()
        .keys()
        .filter(|k| reference.get(k).is_none())
        .cloned()
        .collect();

    let report = WeightReconciliationReport {
        reference_label: reference.label().to_string(),
        candidate_label: candidate.label().to_string(),
        tolerance,
        shared_keys,
        mismatches,
        reference_only_keys,
        candidate_only_keys,
    };

    log_op_end!(
        "reconcile_weights",
        duration_ms = started.elapsed().as_millis() as u64,
        shared = report.shared_keys,
        mismatched = report.mismatches.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_tolerance_matches() {
        let mut reference = WeightedDataset::new("r");
        reference.add("d1", "SPY", 50.0);
        let mut candidate = WeightedDataset::new("c");
        candidate.add("d1", "SPY", 50.004);
        let report = reconcile_weights(&reference, &candidate, 0.01);
        assert!(report.mismatches.is_empty());
        assert_eq!(report.shared_keys, 1);
    }

    #[test]
    fn test_reports_weight_and_membership_deltas() {
        let mut reference = WeightedDataset::new("r");
        reference.add("d1", "SPY", 60.0);
        reference.add("d1", "TLT", 40.0);
        let mut candidate = WeightedDataset::new("c");
        candidate.add("d1", "SPY", 50.0);
        candidate.add("d1", "GLD", 50.0);
        let report = reconcile_weights(&reference, &candidate, 0.0);

        let deltas = &report.mismatches[0].deltas;
        let members: Vec<&str> = deltas.iter().map(|d| d.member.as_str()).collect();
        assert_eq!(members, vec!["GLD", "SPY", "TLT"]);
        assert_eq!(deltas[0].reference, None);
        assert_eq!(deltas[2].candidate, None);
        assert!(report.summary_line().ends_with("Percentage: 100.00"));
    }
}
