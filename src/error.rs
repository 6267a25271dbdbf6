//! Error types for matter-storage

use thiserror::Error;

/// Crate-wide error type.
///
/// Expected "no value" conditions (a blob id with no stored bytes, an empty
/// analysis result) are represented as `Ok(None)` at the call site, never as
/// an error variant. Only faults that should abort the current operation end
/// up here.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid backup archive: {0}")]
    Format(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A template edit session is already open")]
    EditInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
