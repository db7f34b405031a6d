//! Snapshot files.
//!
//! Snapshots are stored as pretty JSON. Loading re-checks entry consistency
//! since the file may have been edited by hand.

use crate::atomic::atomic_write;
use crate::errors::{io_error, serialization_error, Result};
use isoguard_core::snapshot::Snapshot;
use std::path::Path;

/// Write `snapshot` to `path` atomically.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(snapshot).map_err(|e| serialization_error("save_snapshot", path, e))?;
    atomic_write(path, &bytes)
}

/// Read a snapshot previously written by [`save_snapshot`].
///
/// # Errors
///
/// - `Io` if the file cannot be read
/// - `Serialization` if it is not a snapshot document
/// - `InvalidSnapshot` if an entry is keyed inconsistently
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = std::fs::read(path).map_err(|e| io_error("load_snapshot", path, e))?;
    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|e| serialization_error("load_snapshot", path, e))?;
    snapshot
        .check_consistency()
        .map_err(|e| e.with_path(path.display().to_string()))?;
    Ok(snapshot)
}
