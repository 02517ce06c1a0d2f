//! Error types for the engagement engine

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a pipeline run or metrics recording.
///
/// Malformed rows and records with no zone baseline are deliberately not
/// errors; they are skip policies tracked in run diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics store {} could not be written: {source}", path.display())]
    StoreUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
