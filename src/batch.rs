//! Batch processing
//!
//! Discovers input files in a directory and runs each one through the
//! pipeline in isolation. A file that fails or is skipped never stops the
//! others; only setup problems (missing input directory, output directory
//! that cannot be created) abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::adapters::{is_supported, source_for_path};
use crate::config::BatchConfig;
use crate::error::ProcessError;
use crate::pipeline::{process_source, FileStats};

/// What happened to one input file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Written { output: PathBuf, stats: FileStats },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    pub fn to_json(&self) -> Result<String, ProcessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn count(&self, predicate: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.status)).count()
    }
}

/// Runs the pipeline over every supported file of a directory
pub struct BatchProcessor {
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Supported files of the input directory, sorted by path.
    ///
    /// The output directory is never scanned.
    pub fn discover(&self) -> Result<Vec<PathBuf>, ProcessError> {
        let input_dir = &self.config.input_dir;
        if !input_dir.is_dir() {
            return Err(ProcessError::Setup(format!(
                "input directory {} does not exist or is not a directory",
                input_dir.display()
            )));
        }

        let output_dir = fs::canonicalize(self.config.resolved_output_dir()).ok();
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && output_dir.is_some()
                    && fs::canonicalize(entry.path()).ok() == output_dir)
            });

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_supported(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Process every discovered file and write its document
    pub fn run(&self) -> Result<BatchReport, ProcessError> {
        let started_at = Utc::now();
        let output_dir = self.config.resolved_output_dir();

        if !output_dir.is_dir() {
            fs::create_dir_all(&output_dir).map_err(|e| {
                ProcessError::Setup(format!(
                    "cannot create output directory {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
            tracing::info!(output_dir = %output_dir.display(), "created output directory");
        }

        let inputs = self.discover()?;
        tracing::info!(
            input_dir = %self.config.input_dir.display(),
            files = inputs.len(),
            "starting batch"
        );

        let files: Vec<FileOutcome> = if self.config.parallel {
            inputs
                .par_iter()
                .map(|path| process_file(path, &output_dir))
                .collect()
        } else {
            inputs
                .iter()
                .map(|path| process_file(path, &output_dir))
                .collect()
        };

        let report = BatchReport {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            input_dir: self.config.input_dir.clone(),
            output_dir,
            files,
        };

        tracing::info!(
            written = report.written(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch finished"
        );

        Ok(report)
    }
}

/// Run one file through the pipeline and write the result next to the others
pub fn process_file(path: &Path, output_dir: &Path) -> FileOutcome {
    tracing::info!(input = %path.display(), "processing");

    let result = source_for_path(path)
        .and_then(|source| process_source(&*source))
        .and_then(|processed| {
            let output = output_dir.join(&processed.output_name);
            fs::write(&output, &processed.document).map_err(|e| ProcessError::OutputWrite {
                path: output.clone(),
                reason: e.to_string(),
            })?;
            Ok((output, processed.stats))
        });

    let status = match result {
        Ok((output, stats)) => {
            tracing::info!(
                output = %output.display(),
                trials = stats.retained_trials,
                "saved"
            );
            FileStatus::Written { output, stats }
        }
        Err(e) if e.is_skip() => {
            tracing::warn!(input = %path.display(), "skipped: {}", e);
            FileStatus::Skipped {
                reason: e.to_string(),
            }
        }
        Err(e) => {
            tracing::error!(input = %path.display(), "failed: {}", e);
            FileStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    FileOutcome {
        input: path.to_path_buf(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "participant\n").unwrap();
        fs::write(dir.path().join("a.TSV"), "participant\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.csv"), "participant\n").unwrap();

        let flat = BatchProcessor::new(BatchConfig::new(dir.path()));
        let names: Vec<String> = flat
            .discover()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.TSV", "b.csv"]);

        let recursive = BatchProcessor::new(BatchConfig::new(dir.path()).with_recursive(true));
        assert_eq!(recursive.discover().unwrap().len(), 3);
    }

    #[test]
    fn test_recursive_discovery_skips_output_dir() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("adapted");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("old_result.csv"), "participant\n").unwrap();
        fs::write(dir.path().join("p1.csv"), "participant\n").unwrap();

        let processor = BatchProcessor::new(BatchConfig::new(dir.path()).with_recursive(true));
        let files = processor.discover().unwrap();
        assert_eq!(files, vec![dir.path().join("p1.csv")]);
    }

    #[test]
    fn test_missing_input_dir_is_setup_error() {
        let processor = BatchProcessor::new(BatchConfig::new("/nonexistent/trial-flux-input"));
        assert!(matches!(processor.discover(), Err(ProcessError::Setup(_))));
    }
}
