//! Snapshot value types.
//!
//! Entries live in a `BTreeMap` so serialization and iteration order are
//! deterministic, independent of traversal order.

use crate::errors::{ExError, ExErrorKind, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One file's observed state.
///
/// Equality for isolation purposes is `content_hash` only; `modified_at` is
/// metadata and never compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// `/`-separated path relative to the snapshot root
    pub path: String,
    /// Hex-encoded digest of the file bytes
    pub content_hash: String,
    /// Byte length
    pub size: u64,
    /// Last modification time, when the platform reports one
    pub modified_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Content identity, ignoring timestamps.
    pub fn same_content(&self, other: &FileRecord) -> bool {
        self.content_hash == other.content_hash
    }
}

/// Immutable fingerprint of every file under one root at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    root: String,
    captured_at: DateTime<Utc>,
    algorithm: String,
    entries: BTreeMap<String, FileRecord>,
    #[serde(default)]
    unreadable: BTreeSet<String>,
}

impl Snapshot {
    /// Assemble a snapshot from already-computed records.
    ///
    /// Later records with a duplicate path replace earlier ones.
    pub fn from_records(
        root: impl Into<String>,
        algorithm: impl Into<String>,
        records: impl IntoIterator<Item = FileRecord>,
        unreadable: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            root: root.into(),
            captured_at: Utc::now(),
            algorithm: algorithm.into(),
            entries: records.into_iter().map(|r| (r.path.clone(), r)).collect(),
            unreadable: unreadable.into_iter().collect(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn entries(&self) -> &BTreeMap<String, FileRecord> {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.entries.get(path)
    }

    /// Relative paths of every recorded file, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Paths seen during the walk but omitted because they could not be read.
    pub fn unreadable(&self) -> &BTreeSet<String> {
        &self.unreadable
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry is keyed by its own path.
    ///
    /// Snapshots built in-process always pass; this guards snapshots loaded
    /// from disk.
    ///
    /// # Errors
    ///
    /// `InvalidSnapshot` naming the first inconsistent key.
    pub fn check_consistency(&self) -> Result<()> {
        for (key, record) in &self.entries {
            if key != &record.path {
                return Err(ExError::new(ExErrorKind::InvalidSnapshot)
                    .with_op("check_consistency")
                    .with_path(key.clone())
                    .with_message(format!("entry keyed '{}' records path '{}'", key, record.path)));
            }
            if record.content_hash.is_empty() {
                return Err(ExError::new(ExErrorKind::InvalidSnapshot)
                    .with_op("check_consistency")
                    .with_path(key.clone())
                    .with_message("entry has an empty content hash"));
            }
        }
        Ok(())
    }
}
