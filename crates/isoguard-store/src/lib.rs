//! isoguard Store - filesystem persistence and dataset sources
//!
//! Provides:
//! - Atomic file writes (temp file + rename)
//! - Snapshot files, so capture and diff can run in separate processes
//! - Machine-readable and human-readable report files
//! - Dataset sources that reduce a CSV table or a line log to keyed datasets

pub mod atomic;
pub mod errors;
pub mod reports;
pub mod snapshot_file;
pub mod sources;

// Re-export key types
pub use errors::Result;
pub use reports::{write_reconciliation_report, write_report, write_weight_report, ReportPaths};
pub use snapshot_file::{load_snapshot, save_snapshot};
pub use sources::{LogSource, TableSource};
