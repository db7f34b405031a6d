//! Snapshot diff computation engine.
//!
//! Both snapshots keep their entries in ordered maps, so the diff is a single
//! linear merge over the two key sequences.

use crate::diff::model::SnapshotDiff;
use crate::errors::{IsoGuardError, Result};
use crate::snapshot::model::Snapshot;
use crate::{log_op_end, log_op_start};
use std::cmp::Ordering;
use std::time::Instant;

/// Compute the diff between two snapshots.
///
/// Pure: neither snapshot is touched and no I/O happens.
///
/// # Errors
///
/// `InvalidSnapshot` when the snapshots were fingerprinted with different
/// algorithms, since their hashes are not comparable.
pub fn compute_diff(before: &Snapshot, after: &Snapshot) -> Result<SnapshotDiff> {
    if before.algorithm() != after.algorithm() {
        return Err(IsoGuardError::AlgorithmMismatch {
            before: before.algorithm().to_string(),
            after: after.algorithm().to_string(),
        }
        .into());
    }

    let started = Instant::now();
    log_op_start!(
        "diff",
        root = after.root(),
        before_count = before.len(),
        after_count = after.len()
    );

    let mut diff = SnapshotDiff::default();
    let mut left = before.entries().iter().peekable();
    let mut right = after.entries().iter().peekable();

    loop {
        match (left.peek(), right.peek()) {
            (Some((lk, lr)), Some((rk, rr))) => match lk.cmp(rk) {
                Ordering::Less => {
                    diff.removed.push((*lk).clone());
                    left.next();
                }
                Ordering::Greater => {
                    diff.added.push((*rk).clone());
                    right.next();
                }
                Ordering::Equal => {
                    if lr.same_content(rr) {
                        diff.unchanged += 1;
                    } else {
                        diff.changed.push((*lk).clone());
                    }
                    left.next();
                    right.next();
                }
            },
            (Some((lk, _)), None) => {
                diff.removed.push((*lk).clone());
                left.next();
            }
            (None, Some((rk, _))) => {
                diff.added.push((*rk).clone());
                right.next();
            }
            (None, None) => break,
        }
    }

    log_op_end!(
        "diff",
        duration_ms = started.elapsed().as_millis() as u64,
        root = after.root(),
        changed = diff.changed.len(),
        added = diff.added.len(),
        removed = diff.removed.len()
    );
    Ok(diff)
}
