//! Dataset sources.
//!
//! Each source reduces one external file format to a [`KeyedDataset`] or a
//! [`WeightedDataset`]; reconciliation never sees the raw format.
//!
//! [`KeyedDataset`]: isoguard_core::dataset::KeyedDataset
//! [`WeightedDataset`]: isoguard_core::dataset::WeightedDataset

pub mod log;
pub mod table;

pub use log::LogSource;
pub use table::TableSource;

use crate::errors::{dataset_error, io_error, Result};
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Read a text file, honouring a UTF-8 or UTF-16 byte order mark.
///
/// Exported trading logs are sometimes UTF-16, so plain UTF-8 decoding
/// is not enough.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| io_error("load_dataset", path, e))?;
    decode_text(&bytes, &path.display().to_string())
}

pub(crate) fn decode_text(bytes: &[u8], source_name: &str) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return utf8(rest, source_name);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return utf16(rest, source_name, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return utf16(rest, source_name, u16::from_be_bytes);
    }
    utf8(bytes, source_name)
}

fn utf8(bytes: &[u8], source_name: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| dataset_error(source_name, 0, format!("not valid UTF-8: {}", e)))
}

fn utf16(bytes: &[u8], source_name: &str, read: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(dataset_error(source_name, 0, "odd byte count in UTF-16 text"));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| read([c[0], c[1]])).collect();
    String::from_utf16(&units)
        .map_err(|e| dataset_error(source_name, 0, format!("not valid UTF-16: {}", e)))
}

/// Parse a weight cell such as `12.5%` or `12.5`.
pub(crate) fn parse_weight(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|w| w.is_finite())
}
