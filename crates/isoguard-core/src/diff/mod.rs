//! Snapshot diff engine.
//!
//! Compares two snapshots of the same root and classifies every path as
//! unchanged, changed, added or removed.
//!
//! ## Entry point
//!
//! ```ignore
//! use isoguard_core::diff::engine::compute_diff;
//!
//! let diff = compute_diff(&before, &after)?;
//! let summary = isoguard_core::diff::human_summary::render_human_summary(&diff);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical, sorted output.
//! - **Timestamp noise suppression**: `modified_at` differences are never changes.
//! - **Partition**: changed, added and removed are pairwise disjoint; together
//!   with the unchanged paths they cover the union of both key sets.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::compute_diff;
pub use human_summary::render_human_summary;
pub use model::SnapshotDiff;
