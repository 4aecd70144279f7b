//! Tabular sources
//!
//! This module provides the sources that turn an input file into raw,
//! string-keyed rows for the pipeline.

mod delimited;
mod memory;
mod spreadsheet;

pub use delimited::DelimitedSource;
pub use memory::MemorySource;
pub use spreadsheet::SpreadsheetSource;

use std::path::Path;

use crate::error::ProcessError;
use crate::types::RawRow;

/// File extensions the batch runner picks up (case-insensitive)
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "tsv", "xlsx", "xls"];

/// Trait for sources yielding the rows of one input file
pub trait TabularSource {
    /// Identifier of the input, used for naming fallbacks and diagnostics
    fn name(&self) -> &str;

    /// Read every row, in input order
    fn read_rows(&self) -> Result<Vec<RawRow>, ProcessError>;
}

/// Pick a source implementation from the file extension
pub fn source_for_path(path: &Path) -> Result<Box<dyn TabularSource + Send + Sync>, ProcessError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Box::new(DelimitedSource::open(path))),
        "tsv" => Ok(Box::new(DelimitedSource::open(path).with_delimiter(b'\t'))),
        "xlsx" | "xls" => Ok(Box::new(SpreadsheetSource::open(path))),
        other => Err(ProcessError::UnsupportedFormat(format!(
            "{}: unknown extension '{}'",
            path.display(),
            other
        ))),
    }
}

/// Whether the batch runner should consider this path
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}
