//! Trial Flux - Batch cleaner for face recognition experiment exports
//!
//! Trial Flux turns trial-by-trial exports of a recognition experiment into a
//! cleaned per-trial dataset and a per-participant summary through a deterministic
//! pipeline: row normalization → outcome classification → recognition filter
//! → trial selection → condition aggregation → tabular serialization.
//!
//! ## Modules
//!
//! - **Pipeline**: Process the rows of one file into an output document
//! - **Batch**: Discover files in a directory and process each in isolation
//! - **Compare**: Diff the leading rows of two exports

pub mod adapters;
pub mod aggregator;
pub mod batch;
pub mod classifier;
pub mod compare;
pub mod config;
pub mod error;
pub mod filter;
pub mod naming;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod serializer;
pub mod types;

pub use adapters::{
    source_for_path, DelimitedSource, MemorySource, SpreadsheetSource, TabularSource,
};
pub use batch::{BatchProcessor, BatchReport, FileOutcome, FileStatus};
pub use config::BatchConfig;
pub use error::ProcessError;
pub use pipeline::{process_rows, process_source, FileStats, ProcessedFile};
pub use types::{
    ConditionKey, ConditionStats, Outcome, RawRow, SummaryRecord, TrialRecord, CONDITION_GRID,
};

/// Crate version reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
