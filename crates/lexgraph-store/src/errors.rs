//! Error handling for lexgraph-store
//!
//! Wraps lexgraph-core ExError with store-specific helpers

use lexgraph_core::errors::{ExError, ExErrorKind};
use lexgraph_core_types::schema::{STAGE_COMMIT, STAGE_PERSIST};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error for an artifact or store path
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_stage(STAGE_PERSIST)
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create a serialization error for persisted state
pub fn serialization_error(operation: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a fingerprint flush error wrapping the underlying failure
pub fn flush_failed(path: &Path, source: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("flush_fingerprints")
        .with_stage(STAGE_COMMIT)
        .with_message(format!("fingerprint store {} not written", path.display()))
        .with_source(source)
}
