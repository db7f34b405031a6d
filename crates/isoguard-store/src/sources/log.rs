//! Line-oriented log datasets.
//!
//! Each relevant line is whitespace-delimited; the key, member and weight
//! are taken from fixed field positions, e.g.
//!
//! ```text
//! INFO 2024-01-02 allocating 50% AAPL buying
//! ```
//!
//! yields key `2024-01-02`, member `AAPL`, weight `50`.

use super::{decode_text, parse_weight, read_text};
use crate::errors::{dataset_error, Result};
use isoguard_core::dataset::{KeyedDataset, WeightedDataset};
use isoguard_core::errors::IsoGuardError;
use isoguard_core::{log_op_end, log_op_start};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct LogSource {
    /// Only lines containing this token are used
    pub marker: Option<String>,
    /// Lines containing this token are ignored even if they carry the marker
    pub skip_token: Option<String>,
    pub key_field: usize,
    pub member_field: usize,
    pub weight_field: usize,
    /// Member names never reported
    pub excluded: BTreeSet<String>,
}

impl Default for LogSource {
    fn default() -> Self {
        Self {
            marker: Some("buying".to_string()),
            skip_token: Some("stocks".to_string()),
            key_field: 1,
            member_field: 4,
            weight_field: 3,
            excluded: BTreeSet::new(),
        }
    }
}

impl LogSource {
    /// Accept every non-empty line.
    pub fn unfiltered() -> Self {
        Self {
            marker: None,
            skip_token: None,
            ..Self::default()
        }
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn load_keyed(&self, path: &Path, label: &str) -> Result<KeyedDataset> {
        let started = Instant::now();
        log_op_start!("load_log", path = %path.display(), label = label);
        let text = read_text(path)?;
        let dataset = self.parse_keyed(&text, &path.display().to_string(), label)?;
        log_op_end!(
            "load_log",
            duration_ms = started.elapsed().as_millis() as u64,
            key_count = dataset.len()
        );
        Ok(dataset)
    }

    pub fn load_weighted(&self, path: &Path, label: &str) -> Result<WeightedDataset> {
        let started = Instant::now();
        log_op_start!("load_log", path = %path.display(), label = label);
        let text = read_text(path)?;
        let dataset = self.parse_weighted(&text, &path.display().to_string(), label)?;
        log_op_end!(
            "load_log",
            duration_ms = started.elapsed().as_millis() as u64,
            key_count = dataset.len()
        );
        Ok(dataset)
    }

    pub fn parse_keyed(&self, text: &str, source_name: &str, label: &str) -> Result<KeyedDataset> {
        let mut dataset = KeyedDataset::new(label);
        let needed = self.key_field.max(self.member_field);
        self.for_each_line(text, source_name, needed, |_, fields| {
            if self.excluded.contains(fields[self.member_field]) {
                dataset.ensure_key(fields[self.key_field]);
            } else {
                dataset.insert(fields[self.key_field], fields[self.member_field]);
            }
            Ok(())
        })?;
        Ok(dataset)
    }

    pub fn parse_weighted(
        &self,
        text: &str,
        source_name: &str,
        label: &str,
    ) -> Result<WeightedDataset> {
        let mut dataset = WeightedDataset::new(label);
        let needed = self
            .key_field
            .max(self.member_field)
            .max(self.weight_field);
        self.for_each_line(text, source_name, needed, |line, fields| {
            if self.excluded.contains(fields[self.member_field]) {
                return Ok(());
            }
            let raw = fields[self.weight_field];
            let weight = parse_weight(raw).ok_or_else(|| IsoGuardError::InvalidWeight {
                source_name: source_name.to_string(),
                line,
                value: raw.to_string(),
            })?;
            dataset.add(fields[self.key_field], fields[self.member_field], weight);
            Ok(())
        })?;
        Ok(dataset)
    }

    /// Parse raw bytes (UTF-8 or UTF-16 with BOM).
    pub fn parse_keyed_bytes(
        &self,
        bytes: &[u8],
        source_name: &str,
        label: &str,
    ) -> Result<KeyedDataset> {
        let text = decode_text(bytes, source_name)?;
        self.parse_keyed(&text, source_name, label)
    }

    fn accepts(&self, line: &str) -> bool {
        if let Some(marker) = &self.marker {
            if !line.contains(marker.as_str()) {
                return false;
            }
        }
        if let Some(skip) = &self.skip_token {
            if line.contains(skip.as_str()) {
                return false;
            }
        }
        true
    }

    /// Call `f(line_number, fields)` for every accepted line with more than
    /// `max_index` fields. Line numbers are 1-based.
    fn for_each_line<'t, F>(
        &self,
        text: &'t str,
        source_name: &str,
        max_index: usize,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(usize, &[&'t str]) -> Result<()>,
    {
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || !self.accepts(line) {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() <= max_index {
                return Err(dataset_error(
                    source_name,
                    line_no,
                    format!(
                        "expected at least {} fields, found {}",
                        max_index + 1,
                        fields.len()
                    ),
                ));
            }
            f(line_no, &fields)?;
        }
        Ok(())
    }
}
