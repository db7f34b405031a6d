//! Set reconciliation engine.

use crate::dataset::KeyedDataset;
use crate::reconcile::model::{round2, ReconciliationRecord, ReconciliationReport};
use crate::{log_op_end, log_op_start};
use std::collections::BTreeSet;
use std::time::Instant;

/// Compare two member sets for one key.
///
/// The percentage is computed from raw set sizes and rounded once.
pub fn reconcile_key(
    key: &str,
    reference: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
) -> ReconciliationRecord {
    let missing: BTreeSet<String> = reference.difference(candidate).cloned().collect();
    let extra: BTreeSet<String> = candidate.difference(reference).cloned().collect();
    let union = reference.union(candidate).count();
    let percent_difference = if union == 0 {
        None
    } else {
        Some(round2(
            (missing.len() + extra.len()) as f64 / union as f64 * 100.0,
        ))
    };

    ReconciliationRecord {
        key: key.to_string(),
        reference: reference.clone(),
        candidate: candidate.clone(),
        missing,
        extra,
        percent_difference,
    }
}

/// Reconcile `candidate` against `reference`.
///
/// Emits one record per shared key in ascending key order; keys found on
/// only one side are listed in `reference_only_keys` / `candidate_only_keys`.
pub fn reconcile(reference: &KeyedDataset, candidate: &KeyedDataset) -> ReconciliationReport {
    let started = Instant::now();
    log_op_start!(
        "reconcile",
        reference = reference.label(),
        candidate = candidate.label(),
        key_count = reference.len()
    );

    let mut records = Vec::new();
    let mut reference_only_keys = Vec::new();
    for (key, ref_members) in reference.entries() {
        match candidate.get(key) {
            Some(cand_members) => records.push(reconcile_key(key, ref_members, cand_members)),
            None => reference_only_keys.push(key.clone()),
        }
    }
    let candidate_only_keys: Vec<String> = candidate
        .keys()
        .filter(|k| reference.get(k).is_none())
        .cloned()
        .collect();

    let report = ReconciliationReport {
        reference_label: reference.label().to_string(),
        candidate_label: candidate.label().to_string(),
        records,
        reference_only_keys,
        candidate_only_keys,
    };

    log_op_end!(
        "reconcile",
        duration_ms = started.elapsed().as_millis() as u64,
        shared = report.shared_count(),
        mismatched = report.mismatch_count()
    );
    report
}
