//! Line-oriented rendering of reconciliation reports.

use crate::reconcile::model::ReconciliationReport;
use crate::reconcile::weights::WeightReconciliationReport;
use std::collections::BTreeSet;

fn braces(set: &BTreeSet<String>) -> String {
    format!("{{{}}}", set.iter().cloned().collect::<Vec<_>>().join(", "))
}

/// One line per mismatching key, then the summary line.
///
/// ```text
/// Key: 2024-01-02, reference: {AAPL, MSFT} candidate: {AAPL} Missing from candidate: {MSFT} Percentage Difference: 50.00
/// ```
pub fn render_mismatch_log(report: &ReconciliationReport) -> String {
    let mut out = String::new();
    for record in report.mismatches() {
        out.push_str(&format!(
            "Key: {}, {}: {} {}: {}",
            record.key,
            report.reference_label,
            braces(&record.reference),
            report.candidate_label,
            braces(&record.candidate)
        ));
        if !record.missing.is_empty() {
            out.push_str(&format!(
                " Missing from {}: {}",
                report.candidate_label,
                braces(&record.missing)
            ));
        }
        if !record.extra.is_empty() {
            out.push_str(&format!(
                " Extra in {}: {}",
                report.candidate_label,
                braces(&record.extra)
            ));
        }
        let pct = record
            .percent_difference
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!(" Percentage Difference: {}\n", pct));
    }
    if !report.reference_only_keys.is_empty() {
        out.push_str(&format!(
            "Keys only in {}: {}\n",
            report.reference_label,
            report.reference_only_keys.join(", ")
        ));
    }
    if !report.candidate_only_keys.is_empty() {
        out.push_str(&format!(
            "Keys only in {}: {}\n",
            report.candidate_label,
            report.candidate_only_keys.join(", ")
        ));
    }
    out.push_str(&report.summary_line());
    out.push('\n');
    out
}

fn weight(w: Option<f64>) -> String {
    w.map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// One line per mismatching key listing each differing member, then the summary line.
pub fn render_weight_log(report: &WeightReconciliationReport) -> String {
    let mut out = String::new();
    for mismatch in &report.mismatches {
        let deltas: Vec<String> = mismatch
            .deltas
            .iter()
            .map(|d| format!("{} {} vs {}", d.member, weight(d.reference), weight(d.candidate)))
            .collect();
        out.push_str(&format!(
            "Key: {}, {} vs {}: {}\n",
            mismatch.key,
            report.reference_label,
            report.candidate_label,
            deltas.join("; ")
        ));
    }
    out.push_str(&report.summary_line());
    out.push('\n');
    out
}
