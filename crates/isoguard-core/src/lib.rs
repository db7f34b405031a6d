//! isoguard Core - verification kernel
//!
//! This crate provides the pure building blocks for cache-isolation checks
//! and two-source reconciliation:
//! - Streaming content fingerprints with pluggable digests
//! - Directory snapshots captured on a bounded worker pool
//! - Snapshot diffs (changed / added / removed)
//! - Keyed datasets and the keyed reconciler with symmetric-difference metrics
//! - Structured errors and the logging facility shared by every layer

pub mod dataset;
pub mod diff;
pub mod errors;
pub mod fingerprint;
pub mod logging_facility;
pub mod reconcile;
pub mod snapshot;

// Re-export commonly used types
pub use dataset::{KeyedDataset, WeightedDataset};
pub use diff::{compute_diff, SnapshotDiff};
pub use errors::{ExError, ExErrorKind, IsoGuardError, Result};
pub use fingerprint::{Fingerprinter, Sha256Fingerprinter, Sha512Fingerprinter};
pub use reconcile::{reconcile, ReconciliationRecord, ReconciliationReport};
pub use snapshot::{capture, CaptureOptions, FileRecord, Snapshot};
