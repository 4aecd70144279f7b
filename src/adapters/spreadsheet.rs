//! Spreadsheet source
//!
//! Reads the first worksheet of an `.xlsx`/`.xls` workbook. The first row
//! holds the headers; every following row becomes one record.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ProcessError;
use crate::types::RawRow;

use super::TabularSource;

/// Workbook source reading the first sheet
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    name: String,
    path: PathBuf,
}

impl SpreadsheetSource {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path.display().to_string(),
            path: path.to_path_buf(),
        }
    }

    fn read_error(&self, reason: impl ToString) -> ProcessError {
        ProcessError::SourceRead {
            source_name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl TabularSource for SpreadsheetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, ProcessError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.read_error(e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| self.read_error("workbook has no worksheet"))?
            .map_err(|e| self.read_error(e))?;

        let mut lines = range.rows();
        let headers: Vec<String> = match lines.next() {
            Some(header) => header.iter().map(cell_text).collect(),
            None => return Ok(Vec::new()),
        };

        let rows: Vec<RawRow> = lines
            .map(|cells| {
                RawRow::from_pairs(
                    headers
                        .iter()
                        .zip(cells)
                        .filter(|(header, cell)| !header.is_empty() && !matches!(cell, Data::Empty))
                        .map(|(header, cell)| (header.as_str(), cell_text(cell))),
                )
            })
            .filter(|row| !row.is_empty())
            .collect();

        tracing::debug!(source = %self.name, rows = rows.len(), "read worksheet");
        Ok(rows)
    }
}

/// Render a cell as text, the way JavaScript `String(value)` would
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => number_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => number_text(dt.as_f64()),
        Data::Error(e) => e.to_string(),
    }
}

fn number_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity");
    }
    // Display prints the shortest round-trip form and drops `.0`
    format!("{value}")
}
