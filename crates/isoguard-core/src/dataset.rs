//! Keyed datasets produced by a reference or candidate source.
//!
//! A [`KeyedDataset`] maps a key (typically a calendar date) to a set of
//! members (typically ticker symbols). A scalar value is stored as a
//! one-member set so both shapes reconcile the same way.
//!
//! A [`WeightedDataset`] keeps a summed weight per member, for comparing
//! allocations rather than bare selections.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from key to a set of members, tagged with its origin label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KeyedDataset {
    label: String,
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl KeyedDataset {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add `member` under `key`, creating the key if needed.
    pub fn insert(&mut self, key: impl Into<String>, member: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .insert(member.into());
    }

    /// Set `key` to exactly one value, replacing any previous members.
    pub fn insert_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let mut set = BTreeSet::new();
        set.insert(value.into());
        self.entries.insert(key.into(), set);
    }

    /// Make `key` present even if it ends up with no members.
    pub fn ensure_key(&mut self, key: impl Into<String>) {
        self.entries.entry(key.into()).or_default();
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, members: &[&str]) -> Self {
        self.ensure_key(key);
        for m in members {
            self.insert(key, *m);
        }
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mapping from key to member → summed weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WeightedDataset {
    label: String,
    entries: BTreeMap<String, BTreeMap<String, f64>>,
}

impl WeightedDataset {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Accumulate `weight` for `member` under `key`.
    ///
    /// Repeated rows for the same member add up.
    pub fn add(&mut self, key: impl Into<String>, member: impl Into<String>, weight: f64) {
        *self
            .entries
            .entry(key.into())
            .or_default()
            .entry(member.into())
            .or_insert(0.0) += weight;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, key: &str) -> Option<&BTreeMap<String, f64>> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the weights, keeping only which members appear per key.
    pub fn to_keyed(&self) -> KeyedDataset {
        let mut out = KeyedDataset::new(self.label.clone());
        for (key, members) in &self.entries {
            out.ensure_key(key.clone());
            for member in members.keys() {
                out.insert(key.clone(), member.clone());
            }
        }
        out
    }
}
