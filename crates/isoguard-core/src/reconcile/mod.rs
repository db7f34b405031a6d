//! Keyed reconciliation of two independently produced datasets.
//!
//! For every key present on both sides the reconciler reports the members
//! missing from the candidate, the members extra in the candidate and the
//! symmetric-difference percentage against the union. Keys present on one
//! side only are reported separately, never dropped.
//!
//! Records are emitted in ascending key order so reports are diffable.

pub mod engine;
pub mod human_summary;
pub mod model;
pub mod weights;

pub use engine::reconcile;
pub use human_summary::{render_mismatch_log, render_weight_log};
pub use model::{round2, ReconciliationRecord, ReconciliationReport};
pub use weights::{reconcile_weights, WeightDelta, WeightMismatch, WeightReconciliationReport};
