//! Tabular (CSV) datasets.
//!
//! Layout: one row per key. The key sits in `key_column`; every column from
//! `first_member_column` on is a member, named by its header cell. A cell
//! holding `-` or nothing means the member is absent for that key; any other
//! value means present (and, for weights, is the weight).

use super::{decode_text, parse_weight};
use crate::errors::{dataset_error, io_error, Result};
use isoguard_core::dataset::{KeyedDataset, WeightedDataset};
use isoguard_core::errors::IsoGuardError;
use isoguard_core::{log_op_end, log_op_start};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Cell value meaning "member absent".
pub const ABSENT_MARKER: &str = "-";

#[derive(Debug, Clone)]
pub struct TableSource {
    pub key_column: usize,
    pub first_member_column: usize,
    /// Member names for header-less files, in column order from `first_member_column`
    pub member_names: Option<Vec<String>>,
    pub has_header: bool,
    /// Member names never reported (cash positions and the like)
    pub excluded: BTreeSet<String>,
}

impl Default for TableSource {
    fn default() -> Self {
        Self {
            key_column: 0,
            first_member_column: 2,
            member_names: None,
            has_header: true,
            excluded: BTreeSet::new(),
        }
    }
}

/// One parsed row: key plus (member, raw cell) for every present member.
struct Row {
    line: usize,
    key: String,
    cells: Vec<(String, String)>,
}

impl TableSource {
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    /// Load `path` as a keyed dataset labelled `label`.
    pub fn load_keyed(&self, path: &Path, label: &str) -> Result<KeyedDataset> {
        let started = Instant::now();
        log_op_start!("load_table", path = %path.display(), label = label);
        let bytes = std::fs::read(path).map_err(|e| io_error("load_dataset", path, e))?;
        let dataset = self.parse_keyed(&bytes, &path.display().to_string(), label)?;
        log_op_end!(
            "load_table",
            duration_ms = started.elapsed().as_millis() as u64,
            key_count = dataset.len()
        );
        Ok(dataset)
    }

    /// Load `path` as a weighted dataset labelled `label`.
    pub fn load_weighted(&self, path: &Path, label: &str) -> Result<WeightedDataset> {
        let started = Instant::now();
        log_op_start!("load_table", path = %path.display(), label = label);
        let bytes = std::fs::read(path).map_err(|e| io_error("load_dataset", path, e))?;
        let dataset = self.parse_weighted(&bytes, &path.display().to_string(), label)?;
        log_op_end!(
            "load_table",
            duration_ms = started.elapsed().as_millis() as u64,
            key_count = dataset.len()
        );
        Ok(dataset)
    }

    pub fn parse_keyed(&self, bytes: &[u8], source_name: &str, label: &str) -> Result<KeyedDataset> {
        let mut dataset = KeyedDataset::new(label);
        for row in self.rows(bytes, source_name)? {
            dataset.ensure_key(row.key.clone());
            for (member, _) in row.cells {
                dataset.insert(row.key.clone(), member);
            }
        }
        Ok(dataset)
    }

    pub fn parse_weighted(
        &self,
        bytes: &[u8],
        source_name: &str,
        label: &str,
    ) -> Result<WeightedDataset> {
        let mut dataset = WeightedDataset::new(label);
        for row in self.rows(bytes, source_name)? {
            for (member, cell) in row.cells {
                let weight = parse_weight(&cell).ok_or_else(|| IsoGuardError::InvalidWeight {
                    source_name: source_name.to_string(),
                    line: row.line,
                    value: cell.clone(),
                })?;
                dataset.add(row.key.clone(), member, weight);
            }
        }
        Ok(dataset)
    }

    fn rows(&self, bytes: &[u8], source_name: &str) -> Result<Vec<Row>> {
        let text = decode_text(bytes, source_name)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let names: Vec<String> = match (&self.member_names, self.has_header) {
            (Some(names), has_header) => {
                if has_header {
                    records.next();
                }
                names.clone()
            }
            (None, true) => match records.next() {
                Some(header) => {
                    let header = header.map_err(|e| csv_error(source_name, e))?;
                    header
                        .iter()
                        .skip(self.first_member_column)
                        .map(|h| h.trim().to_string())
                        .collect()
                }
                None => return Ok(Vec::new()),
            },
            (None, false) => {
                return Err(dataset_error(
                    source_name,
                    0,
                    "header-less table needs explicit member names",
                ))
            }
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(|e| csv_error(source_name, e))?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let key = match record.get(self.key_column) {
                Some(k) if !k.trim().is_empty() => k.trim().to_string(),
                _ => continue,
            };

            let mut cells = Vec::new();
            for (offset, raw) in record.iter().skip(self.first_member_column).enumerate() {
                let cell = raw.trim();
                if cell.is_empty() || cell == ABSENT_MARKER {
                    continue;
                }
                let Some(name) = names.get(offset) else {
                    return Err(dataset_error(
                        source_name,
                        line,
                        format!("value in unnamed column {}", offset + self.first_member_column),
                    ));
                };
                if name.is_empty() || self.excluded.contains(name) {
                    continue;
                }
                cells.push((name.clone(), cell.to_string()));
            }
            rows.push(Row { line, key, cells });
        }
        Ok(rows)
    }
}

fn csv_error(source_name: &str, err: csv::Error) -> isoguard_core::errors::ExError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(0);
    dataset_error(source_name, line, err.to_string())
}
