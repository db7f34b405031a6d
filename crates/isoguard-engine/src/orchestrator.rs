//! Isolation verification run.
//!
//! ## Phases (strictly sequential):
//! 1. Clean: wipe and recreate the root
//! 2. FirstInvocation: submit the first workload, require success
//! 3. WaitForArtifacts: fixed grace period for asynchronous writes
//! 4. CaptureBefore: snapshot, require at least one file
//! 5. SecondInvocation: submit the second workload with a new request id
//! 6. WaitForArtifacts, then CaptureAfter
//! 7. Compare: Pass iff nothing was changed or removed
//!
//! Every failure becomes an `Aborted` outcome naming the phase; the run never
//! returns an error and never retries.

use crate::invoker::{InvocationRequest, SystemUnderTest};
use chrono::{DateTime, Utc};
use isoguard_core::diff::{compute_diff, SnapshotDiff};
use isoguard_core::errors::{io_error, ExError, ExErrorKind, Result};
use isoguard_core::fingerprint::Fingerprinter;
use isoguard_core::snapshot::{capture, CaptureOptions, Snapshot};
use isoguard_core::{log_op_end, log_op_error, log_op_start};
use isoguard_core_types::{RequestId, RunId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything one verification run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPlan {
    pub root: PathBuf,
    pub first_payload: serde_json::Value,
    pub second_payload: serde_json::Value,
    pub period: String,
    pub end_date: String,
    pub grace_period: Duration,
    pub invocation_timeout: Duration,
    pub capture_timeout: Duration,
    pub workers: usize,
    /// Remove the root once the verdict is known
    pub cleanup_on_exit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Clean,
    FirstInvocation,
    WaitForArtifacts,
    CaptureBefore,
    SecondInvocation,
    CaptureAfter,
    Compare,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Clean => "clean",
            Phase::FirstInvocation => "first_invocation",
            Phase::WaitForArtifacts => "wait_for_artifacts",
            Phase::CaptureBefore => "capture_before",
            Phase::SecondInvocation => "second_invocation",
            Phase::CaptureAfter => "capture_after",
            Phase::Compare => "compare",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostics for a run that reached a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub run_id: RunId,
    pub root: String,
    pub first_request_id: RequestId,
    pub second_request_id: RequestId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub before_files: Vec<String>,
    pub after_files: Vec<String>,
    pub diff: SnapshotDiff,
    /// Paths that could not be read during either capture
    pub warnings: Vec<String>,
    /// Fail driven solely by files unreadable during the after-capture
    pub inconclusive: bool,
}

/// Diagnostics for a run that ended without a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbortedRun {
    pub run_id: RunId,
    pub root: String,
    pub phase: Phase,
    pub error_code: String,
    pub message: String,
    pub request_id: Option<RequestId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Pass(VerificationReport),
    Fail(VerificationReport),
    Aborted(AbortedRun),
}

impl VerificationOutcome {
    pub fn verdict(&self) -> &'static str {
        match self {
            VerificationOutcome::Pass(_) => "pass",
            VerificationOutcome::Fail(_) => "fail",
            VerificationOutcome::Aborted(_) => "aborted",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, VerificationOutcome::Pass(_))
    }

    /// Process exit code: 0 pass, 1 fail, 2 aborted.
    pub fn exit_code(&self) -> i32 {
        match self {
            VerificationOutcome::Pass(_) => 0,
            VerificationOutcome::Fail(_) => 1,
            VerificationOutcome::Aborted(_) => 2,
        }
    }

    pub fn report(&self) -> Option<&VerificationReport> {
        match self {
            VerificationOutcome::Pass(r) | VerificationOutcome::Fail(r) => Some(r),
            VerificationOutcome::Aborted(_) => None,
        }
    }

    pub fn run_id(&self) -> &RunId {
        match self {
            VerificationOutcome::Pass(r) | VerificationOutcome::Fail(r) => &r.run_id,
            VerificationOutcome::Aborted(a) => &a.run_id,
        }
    }
}

/// An error tagged with the phase it interrupted.
struct PhaseError {
    phase: Phase,
    error: ExError,
}

trait InPhase<T> {
    fn in_phase(self, phase: Phase) -> std::result::Result<T, PhaseError>;
}

impl<T> InPhase<T> for Result<T> {
    fn in_phase(self, phase: Phase) -> std::result::Result<T, PhaseError> {
        self.map_err(|error| PhaseError { phase, error })
    }
}

/// Run one isolation check end to end.
///
/// The root is exclusive to this run for its whole duration; concurrent runs
/// must use distinct roots.
pub fn verify_isolation(
    plan: &VerifyPlan,
    sut: &dyn SystemUnderTest,
    fingerprinter: &dyn Fingerprinter,
) -> VerificationOutcome {
    let started = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();
    let root_label = plan.root.display().to_string();
    log_op_start!("verify_isolation", run_id = %run_id, root = %root_label);

    let outcome = match run_phases(plan, sut, fingerprinter) {
        Ok(phases) => {
            let inconclusive = is_inconclusive(&phases.diff, &phases.after);
            let report = VerificationReport {
                run_id: run_id.clone(),
                root: root_label.clone(),
                first_request_id: phases.first_request_id,
                second_request_id: phases.second_request_id,
                started_at,
                finished_at: Utc::now(),
                before_files: phases.before.paths(),
                after_files: phases.after.paths(),
                warnings: unreadable_warnings(&phases.before, &phases.after),
                inconclusive,
                diff: phases.diff,
            };
            if report.diff.violates_isolation() {
                VerificationOutcome::Fail(report)
            } else {
                VerificationOutcome::Pass(report)
            }
        }
        Err(PhaseError { phase, error }) => {
            log_op_error!(
                "verify_isolation",
                error.clone(),
                duration_ms = started.elapsed().as_millis() as u64,
                run_id = %run_id,
                phase = phase.as_str()
            );
            VerificationOutcome::Aborted(AbortedRun {
                run_id: run_id.clone(),
                root: root_label.clone(),
                phase,
                error_code: error.code().to_string(),
                message: error.to_string(),
                request_id: error.request_id().cloned(),
                started_at,
                finished_at: Utc::now(),
            })
        }
    };

    if plan.cleanup_on_exit {
        if let Err(e) = std::fs::remove_dir_all(&plan.root) {
            tracing::warn!(
                component = module_path!(),
                op = "verify_isolation",
                root = %root_label,
                "teardown failed: {}",
                e
            );
        }
    }

    log_op_end!(
        "verify_isolation",
        duration_ms = started.elapsed().as_millis() as u64,
        run_id = %run_id,
        verdict = outcome.verdict()
    );
    outcome
}

struct CompletedPhases {
    first_request_id: RequestId,
    second_request_id: RequestId,
    before: Snapshot,
    after: Snapshot,
    diff: SnapshotDiff,
}

fn run_phases(
    plan: &VerifyPlan,
    sut: &dyn SystemUnderTest,
    fingerprinter: &dyn Fingerprinter,
) -> std::result::Result<CompletedPhases, PhaseError> {
    reset_root(&plan.root).in_phase(Phase::Clean)?;

    let first_request_id =
        invoke_once(plan, sut, &plan.first_payload).in_phase(Phase::FirstInvocation)?;
    wait_for_artifacts(plan);
    let before = capture_root(plan, fingerprinter).in_phase(Phase::CaptureBefore)?;
    if before.is_empty() {
        return Err(PhaseError {
            phase: Phase::CaptureBefore,
            error: ExError::new(ExErrorKind::NoArtifactsProduced)
                .with_op("capture_before")
                .with_path(plan.root.display().to_string())
                .with_request_id(first_request_id)
                .with_message("first invocation left no files under the root"),
        });
    }

    let second_request_id =
        invoke_once(plan, sut, &plan.second_payload).in_phase(Phase::SecondInvocation)?;
    wait_for_artifacts(plan);
    let after = capture_root(plan, fingerprinter).in_phase(Phase::CaptureAfter)?;

    let diff = compute_diff(&before, &after).in_phase(Phase::Compare)?;
    Ok(CompletedPhases {
        first_request_id,
        second_request_id,
        before,
        after,
        diff,
    })
}

fn reset_root(root: &Path) -> Result<()> {
    if root.exists() {
        std::fs::remove_dir_all(root)
            .map_err(|e| io_error("clean", e).with_path(root.display().to_string()))?;
    }
    std::fs::create_dir_all(root)
        .map_err(|e| io_error("clean", e).with_path(root.display().to_string()))
}

/// Submit one workload and insist on a timely success response.
fn invoke_once(
    plan: &VerifyPlan,
    sut: &dyn SystemUnderTest,
    payload: &serde_json::Value,
) -> Result<RequestId> {
    let request = InvocationRequest {
        payload: payload.clone(),
        period: plan.period.clone(),
        request_id: RequestId::new(),
        end_date: plan.end_date.clone(),
    };

    let started = Instant::now();
    let response = sut
        .invoke(&request, plan.invocation_timeout)
        .map_err(|e| e.with_request_id(request.request_id.clone()))?;
    let elapsed = started.elapsed();

    if elapsed > plan.invocation_timeout {
        return Err(ExError::new(ExErrorKind::Timeout)
            .with_op("invoke")
            .with_request_id(request.request_id)
            .with_message(format!(
                "invocation took {} ms, limit {} ms",
                elapsed.as_millis(),
                plan.invocation_timeout.as_millis()
            )));
    }
    if !response.success {
        return Err(ExError::new(ExErrorKind::SetupFailed)
            .with_op("invoke")
            .with_request_id(request.request_id)
            .with_message(format!(
                "system under test answered with status {}",
                response.status
            )));
    }
    Ok(request.request_id)
}

// Race-prone: the system under test gives no "artifacts settled" signal.
fn wait_for_artifacts(plan: &VerifyPlan) {
    if !plan.grace_period.is_zero() {
        tracing::debug!(
            component = module_path!(),
            op = "verify_isolation",
            phase = Phase::WaitForArtifacts.as_str(),
            grace_ms = plan.grace_period.as_millis() as u64,
        );
        std::thread::sleep(plan.grace_period);
    }
}

fn capture_root(plan: &VerifyPlan, fingerprinter: &dyn Fingerprinter) -> Result<Snapshot> {
    let options = CaptureOptions {
        workers: plan.workers,
        timeout: Some(plan.capture_timeout),
    };
    capture(&plan.root, fingerprinter, &options)
}

/// A Fail is inconclusive when nothing changed and every removed path was
/// merely unreadable during the after-capture.
fn is_inconclusive(diff: &SnapshotDiff, after: &Snapshot) -> bool {
    diff.violates_isolation()
        && diff.changed.is_empty()
        && diff.removed.iter().all(|p| after.unreadable().contains(p))
}

fn unreadable_warnings(before: &Snapshot, after: &Snapshot) -> Vec<String> {
    let before_warnings = before
        .unreadable()
        .iter()
        .map(|p| format!("unreadable during capture_before: {}", p));
    let after_warnings = after
        .unreadable()
        .iter()
        .map(|p| format!("unreadable during capture_after: {}", p));
    before_warnings.chain(after_warnings).collect()
}
