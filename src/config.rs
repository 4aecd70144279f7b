//! Batch configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output directory created inside the input directory when none is given
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "adapted";

/// Settings for a batch run over one input directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory scanned for input files
    pub input_dir: PathBuf,
    /// Where documents are written; `<input_dir>/adapted` when unset
    pub output_dir: Option<PathBuf>,
    /// Process files on the rayon thread pool
    pub parallel: bool,
    /// Descend into subdirectories of the input directory
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: None,
            parallel: false,
            recursive: false,
        }
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl AsRef<Path>) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = Some(output_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(DEFAULT_OUTPUT_DIR_NAME))
    }
}
