//! Pipeline orchestration
//!
//! This module provides the public API for processing one input file.
//! It runs the full pipeline from raw rows to the rendered output document.

use serde::Serialize;

use crate::adapters::TabularSource;
use crate::aggregator::ConditionAggregator;
use crate::classifier::OutcomeClassifier;
use crate::error::ProcessError;
use crate::filter::{RecognitionFilter, TrialSelector};
use crate::naming::OutputNamer;
use crate::normalizer::RowNormalizer;
use crate::serializer::TabularSerializer;
use crate::types::{RawRow, SummaryRecord, TrialRecord};

/// Row counts collected while processing one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub raw_rows: usize,
    /// Rows of famous images the participant did not recognize
    pub removed_rows: usize,
    pub removed_images: usize,
    pub dropped_probe_rows: usize,
    pub retained_trials: usize,
    pub gender_column: Option<String>,
}

/// Everything produced for one input file
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub input_name: String,
    /// Output file name, extension included
    pub output_name: String,
    pub trials: Vec<TrialRecord>,
    pub summary: Option<SummaryRecord>,
    pub document: String,
    pub stats: FileStats,
}

/// Read a source and run it through the pipeline.
pub fn process_source(source: &dyn TabularSource) -> Result<ProcessedFile, ProcessError> {
    let rows = source.read_rows()?;
    process_rows(source.name(), &rows)
}

/// Process the rows of one input file.
///
/// Pipeline stages:
/// 1. RowNormalizer - Map raw rows to canonical trial records
/// 2. OutcomeClassifier - Attach outcome, condition label and outcome RT
/// 3. RecognitionFilter - Drop unrecognized famous images
/// 4. TrialSelector - Keep presentation trials
/// 5. ConditionAggregator - Summarize the condition grid
/// 6. TabularSerializer - Render the output document
/// 7. OutputNamer - Name the output
///
/// Empty input and an empty dataset after filtering are reported as
/// [`ProcessError::EmptySource`] and [`ProcessError::DegenerateDataset`].
pub fn process_rows(input_name: &str, rows: &[RawRow]) -> Result<ProcessedFile, ProcessError> {
    if rows.is_empty() {
        return Err(ProcessError::EmptySource(input_name.to_string()));
    }

    // Stages 1-2: Normalize and classify every row
    let normalizer = RowNormalizer::for_dataset(rows);
    let trials: Vec<TrialRecord> = rows
        .iter()
        .map(|row| OutcomeClassifier::classify(normalizer.normalize(row)))
        .collect();

    // Stage 3: Remove famous images the participant did not recognize
    let recognition = RecognitionFilter::apply(trials);

    // Stage 4: Keep presentation trials only
    let (trials, dropped_probe_rows) = TrialSelector::select(recognition.trials);

    if trials.is_empty() {
        return Err(ProcessError::DegenerateDataset(input_name.to_string()));
    }

    // Stage 5: Aggregate the condition grid
    let summary = ConditionAggregator::aggregate(&trials);

    // Stages 6-7: Render and name
    let document = TabularSerializer::render(&trials, summary.as_ref());
    let output_name = OutputNamer::file_name(trials.first(), input_name);

    let stats = FileStats {
        raw_rows: rows.len(),
        removed_rows: recognition.removed_rows,
        removed_images: recognition.removed_images.len(),
        dropped_probe_rows,
        retained_trials: trials.len(),
        gender_column: normalizer.gender_column().map(str::to_string),
    };

    tracing::debug!(input = input_name, ?stats, "pipeline finished");

    Ok(ProcessedFile {
        input_name: input_name.to_string(),
        output_name,
        trials,
        summary,
        document,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySource;

    const GENDER: &str = "female=\"1\", male=\"2\"";

    fn presentation(image: &str, famous: &str, old_new: &str, key: &str, rt: &str) -> RawRow {
        RawRow::from_pairs([
            ("participant", "P01"),
            ("session", "2"),
            ("age", "27"),
            (GENDER, "2"),
            ("faceTesting", image),
            ("race", "afrikan"),
            ("isFamous", famous),
            ("orientation", "flipped"),
            ("oldnew", old_new),
            ("testkeys.keys", key),
            ("testkeys.rt", rt),
            ("faceAsking", ""),
            ("familiarnessKeys.keys", ""),
        ])
    }

    fn probe(image: &str, familiarity: &str) -> RawRow {
        RawRow::from_pairs([
            ("participant", "P01"),
            ("session", "2"),
            ("age", "27"),
            (GENDER, "2"),
            ("faceTesting", ""),
            ("faceAsking", image),
            ("familiarnessKeys.keys", familiarity),
        ])
    }

    #[test]
    fn test_full_pipeline() {
        let rows = vec![
            presentation("f1.jpg", "famous", "old", "right", "0.40"),
            presentation("f2.jpg", "famous", "old", "right", "0.80"),
            presentation("f3.jpg", "famous", "new", "right", "0.55"),
            presentation("f4.jpg", "famous", "new", "left", "0.65"),
            probe("f1.jpg", "4"),
            probe("f2.jpg", "2"),
        ];

        let processed = process_rows("raw/p01.csv", &rows).unwrap();

        assert_eq!(processed.output_name, "P01_male-2.csv");
        assert_eq!(processed.trials.len(), 3);
        assert_eq!(processed.stats.removed_rows, 2);
        assert_eq!(processed.stats.removed_images, 1);
        assert_eq!(processed.stats.dropped_probe_rows, 1);
        assert_eq!(processed.stats.gender_column.as_deref(), Some(GENDER));

        let summary = processed.summary.as_ref().unwrap();
        let fla = summary.cells.iter().find(|c| c.key.code() == "FLA").unwrap();
        assert_eq!(fla.hit_rate, "1.00");
        assert_eq!(fla.false_alarm_rate, "0.50");
        assert_eq!(fla.mean_rt, "0.80");

        assert!(processed.document.contains("\n\nparticipant,session,age,gender,FNC_HIT"));
        assert!(!processed.document.contains("f1.jpg"));
    }

    #[test]
    fn test_empty_source() {
        let err = process_rows("empty.csv", &[]).unwrap_err();
        assert!(matches!(err, ProcessError::EmptySource(_)));
        assert!(err.is_skip());
    }

    #[test]
    fn test_degenerate_dataset() {
        let rows = vec![
            presentation("f1.jpg", "famous", "old", "right", "0.40"),
            probe("f1.jpg", "4"),
        ];
        let err = process_rows("p01.csv", &rows).unwrap_err();
        assert!(matches!(err, ProcessError::DegenerateDataset(_)));
    }

    #[test]
    fn test_naming_falls_back_without_session() {
        let rows = vec![RawRow::from_pairs([
            ("participant", "P09"),
            ("faceTesting", "u1.jpg"),
            ("oldnew", "new"),
        ])];
        let processed = process_rows("data/subject9.csv", &rows).unwrap();
        assert_eq!(processed.output_name, "subject9.csv");
        assert_eq!(processed.stats.gender_column, None);
    }

    #[test]
    fn test_process_source() {
        let source = MemorySource::new(
            "mem.csv",
            vec![presentation("u1.jpg", "unknown", "old", "left", "0.3")],
        );
        let processed = process_source(&source).unwrap();
        assert_eq!(processed.input_name, "mem.csv");
        assert_eq!(processed.trials[0].gender, "male");
        assert_eq!(processed.trials[0].outcome, None);
    }
}
