//! Delimited text source
//!
//! Reads CSV/TSV input with a header row. Short records simply lack the
//! trailing columns, extra fields without a header are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::ProcessError;
use crate::types::RawRow;

use super::TabularSource;

#[derive(Debug, Clone)]
enum Input {
    Path(PathBuf),
    Text(String),
}

/// Delimited text source backed by a file or an in-memory buffer
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    name: String,
    input: Input,
    delimiter: u8,
}

impl DelimitedSource {
    /// Comma-delimited source reading from `path`
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path.display().to_string(),
            input: Input::Path(path.to_path_buf()),
            delimiter: b',',
        }
    }

    /// Comma-delimited source over text already read (e.g. from stdin)
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: Input::Text(text.into()),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn read_error(&self, reason: impl ToString) -> ProcessError {
        ProcessError::SourceRead {
            source_name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl TabularSource for DelimitedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, ProcessError> {
        let rows = match &self.input {
            Input::Path(path) => {
                let file = File::open(path).map_err(|e| self.read_error(e))?;
                read_records(file, self.delimiter)
            }
            Input::Text(text) => read_records(text.as_bytes(), self.delimiter),
        };
        rows.map_err(|e| self.read_error(e))
    }
}

fn read_records<R: Read>(reader: R, delimiter: u8) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        rows.push(RawRow::from_pairs(headers.iter().zip(record.iter())));
    }

    Ok(rows)
}
