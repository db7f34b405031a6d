//! Report files: a machine-readable JSON document next to a human-readable
//! text rendering.

use crate::atomic::atomic_write;
use crate::errors::{serialization_error, Result};
use isoguard_core::reconcile::human_summary::{render_mismatch_log, render_weight_log};
use isoguard_core::reconcile::{ReconciliationReport, WeightReconciliationReport};
use isoguard_core::{log_op_end, log_op_start};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Locations of the two files written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub text: PathBuf,
}

/// Write `<dir>/<stem>.json` and `<dir>/<stem>.<text_ext>`.
pub fn write_report<T: Serialize>(
    dir: &Path,
    stem: &str,
    text_ext: &str,
    value: &T,
    text: &str,
) -> Result<ReportPaths> {
    let started = Instant::now();
    log_op_start!("write_report", dir = %dir.display(), stem = stem);

    let json = dir.join(format!("{}.json", stem));
    let text_path = dir.join(format!("{}.{}", stem, text_ext));
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| serialization_error("write_report", &json, e))?;
    atomic_write(&json, &bytes)?;
    atomic_write(&text_path, text.as_bytes())?;

    log_op_end!(
        "write_report",
        duration_ms = started.elapsed().as_millis() as u64,
        stem = stem
    );
    Ok(ReportPaths {
        json,
        text: text_path,
    })
}

/// Persist a set reconciliation as `<stem>.json` + `<stem>.diff.log`.
pub fn write_reconciliation_report(
    dir: &Path,
    stem: &str,
    report: &ReconciliationReport,
) -> Result<ReportPaths> {
    write_report(dir, stem, "diff.log", report, &render_mismatch_log(report))
}

/// Persist a weight reconciliation as `<stem>.json` + `<stem>.diff.log`.
pub fn write_weight_report(
    dir: &Path,
    stem: &str,
    report: &WeightReconciliationReport,
) -> Result<ReportPaths> {
    write_report(dir, stem, "diff.log", report, &render_weight_log(report))
}
