//! Directory snapshots.
//!
//! ## Responsibilities
//!
//! - Walk a directory root and fingerprint every regular file
//! - Produce an immutable path → [`FileRecord`] mapping
//! - Record files that could not be read instead of failing the capture
//!
//! ## Non-Responsibilities
//!
//! - Persistence of snapshot files (handled by `isoguard-store`)
//! - Comparing snapshots (handled by [`crate::diff`])

pub mod engine;
pub mod model;

pub use engine::{capture, CaptureOptions};
pub use model::{FileRecord, Snapshot};
