//! Several verification runs at once.
//!
//! Each plan gets its own scoped thread. Inside a plan the phases stay
//! sequential; only different roots run side by side.

use crate::invoker::SystemUnderTest;
use crate::orchestrator::{verify_isolation, VerificationOutcome, VerifyPlan};
use isoguard_core::errors::{ExError, ExErrorKind, Result};
use isoguard_core::fingerprint::Fingerprinter;
use isoguard_core::{log_op_end, log_op_start};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Absolute, `.`/`..`-free form of `root`. Lexical only: a root may not
/// exist until its Clean phase runs.
fn normalize_root(root: &Path) -> PathBuf {
    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(root))
            .unwrap_or_else(|_| root.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A run cleans its whole root, so no root may equal or contain another.
fn check_disjoint_roots(plans: &[VerifyPlan]) -> Result<()> {
    let roots: Vec<PathBuf> = plans.iter().map(|p| normalize_root(&p.root)).collect();
    for (i, a) in roots.iter().enumerate() {
        for b in &roots[i + 1..] {
            if a.starts_with(b) || b.starts_with(a) {
                return Err(ExError::new(ExErrorKind::InvalidInput)
                    .with_op("run_scenarios")
                    .with_path(a.display().to_string())
                    .with_message(format!("root overlaps with {}", b.display())));
            }
        }
    }
    Ok(())
}

/// Run every plan concurrently; outcomes come back in input order.
///
/// # Errors
///
/// - `InvalidInput` if two plans share a root or one root is inside another
/// - `Internal` if a run thread panicked
pub fn run_scenarios(
    plans: &[VerifyPlan],
    sut: &dyn SystemUnderTest,
    fingerprinter: &dyn Fingerprinter,
) -> Result<Vec<VerificationOutcome>> {
    let started = Instant::now();
    log_op_start!("run_scenarios", scenario_count = plans.len());

    check_disjoint_roots(plans)?;

    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = plans
            .iter()
            .map(|plan| scope.spawn(move || verify_isolation(plan, sut, fingerprinter)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().map_err(|_| {
                    ExError::new(ExErrorKind::Internal)
                        .with_op("run_scenarios")
                        .with_message("scenario thread panicked")
                })
            })
            .collect::<Result<Vec<_>>>()
    })?;

    log_op_end!(
        "run_scenarios",
        duration_ms = started.elapsed().as_millis() as u64,
        passed = outcomes.iter().filter(|o| o.is_pass()).count()
    );
    Ok(outcomes)
}
