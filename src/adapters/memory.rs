//! In-memory source

use crate::error::ProcessError;
use crate::types::RawRow;

use super::TabularSource;

/// Source over rows that are already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    rows: Vec<RawRow>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl TabularSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, ProcessError> {
        Ok(self.rows.clone())
    }
}
