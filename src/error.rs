//! Error types for Trial Flux

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while processing a trial file
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to read source {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Source {0} contains no rows")]
    EmptySource(String),

    #[error("No trials left in {0} after filtering")]
    DegenerateDataset(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to write {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },

    #[error("Setup error: {0}")]
    Setup(String),
}

impl ProcessError {
    /// Warnings that skip a single file rather than failing it
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ProcessError::EmptySource(_) | ProcessError::DegenerateDataset(_)
        )
    }
}
