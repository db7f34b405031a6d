//! Error handling for isoguard-store
//!
//! Wraps isoguard-core ExError with store-specific helpers

use isoguard_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error carrying the path it happened on
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a dataset parse error
pub fn dataset_error(source_name: &str, line: usize, reason: impl Into<String>) -> ExError {
    isoguard_core::errors::IsoGuardError::DatasetParse {
        source_name: source_name.to_string(),
        line,
        reason: reason.into(),
    }
    .into()
}

/// Create a serialization error for the given file
pub fn serialization_error(operation: &str, path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}
