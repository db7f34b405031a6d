//! Verification report files.

use crate::orchestrator::VerificationOutcome;
use isoguard_core::diff::render_human_summary;
use isoguard_core::errors::Result;
use isoguard_store::reports::{write_report, ReportPaths};
use std::path::Path;

/// Plain-text summary of one run.
pub fn render_verification_summary(outcome: &VerificationOutcome) -> String {
    let mut out = format!("Verdict: {}\n", outcome.verdict().to_uppercase());
    out.push_str(&format!("Run: {}\n", outcome.run_id()));

    match outcome {
        VerificationOutcome::Pass(report) | VerificationOutcome::Fail(report) => {
            out.push_str(&format!("Root: {}\n", report.root));
            out.push_str(&format!(
                "Requests: first={} second={}\n",
                report.first_request_id, report.second_request_id
            ));
            out.push_str(&format!(
                "Files before: {}, after: {}\n\n",
                report.before_files.len(),
                report.after_files.len()
            ));
            out.push_str(&render_human_summary(&report.diff));
            if !report.warnings.is_empty() {
                out.push_str("\n### Warnings\n\n");
                for warning in &report.warnings {
                    out.push_str(&format!("- {}\n", warning));
                }
            }
            if report.inconclusive {
                out.push_str(
                    "\nInconclusive: every removed path was unreadable during capture_after.\n",
                );
            }
        }
        VerificationOutcome::Aborted(aborted) => {
            out.push_str(&format!("Root: {}\n", aborted.root));
            out.push_str(&format!("Phase: {}\n", aborted.phase));
            out.push_str(&format!("Error: {}\n", aborted.message));
            if let Some(request_id) = &aborted.request_id {
                out.push_str(&format!("Request: {}\n", request_id));
            }
        }
    }
    out
}

/// Write `verification.json` and `verification.txt` into `dir`.
pub fn write_verification_report(dir: &Path, outcome: &VerificationOutcome) -> Result<ReportPaths> {
    write_report(
        dir,
        "verification",
        "txt",
        outcome,
        &render_verification_summary(outcome),
    )
}
