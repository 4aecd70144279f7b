//! Trial filtering
//!
//! Two dataset-level passes run between classification and aggregation:
//! - [`RecognitionFilter`] drops every row of a famous stimulus that the
//!   participant marked as unrecognized in the probe phase
//! - [`TrialSelector`] keeps presentation trials only

use std::collections::BTreeSet;

use crate::types::TrialRecord;

const FAMOUS: &str = "famous";
const NOT_RECOGNIZED: &str = "4";

/// Result of a recognition filter pass
#[derive(Debug, Clone, Default)]
pub struct RecognitionResult {
    pub trials: Vec<TrialRecord>,
    /// Images whose rows were dropped
    pub removed_images: BTreeSet<String>,
    pub removed_rows: usize,
}

/// Cross-references presentation and probe trials by image identifier
pub struct RecognitionFilter;

impl RecognitionFilter {
    /// Famous presentation stimuli the participant later reported as unknown
    pub fn removal_set(trials: &[TrialRecord]) -> BTreeSet<String> {
        let famous: BTreeSet<&str> = trials
            .iter()
            .filter(|t| !t.test_image_id.is_empty() && t.is_famous == FAMOUS)
            .map(|t| t.test_image_id.as_str())
            .collect();

        let unrecognized: BTreeSet<&str> = trials
            .iter()
            .filter(|t| !t.ask_image_id.is_empty() && t.familiarity_response == NOT_RECOGNIZED)
            .map(|t| t.ask_image_id.as_str())
            .collect();

        famous
            .intersection(&unrecognized)
            .map(|image| image.to_string())
            .collect()
    }

    /// Drop presentation and probe rows of every image in the removal set
    pub fn apply(trials: Vec<TrialRecord>) -> RecognitionResult {
        let removed_images = Self::removal_set(&trials);
        let before = trials.len();

        let trials: Vec<TrialRecord> = trials
            .into_iter()
            .filter(|t| {
                let image = t.image_id();
                image.is_empty() || !removed_images.contains(image)
            })
            .collect();

        let removed_rows = before - trials.len();
        if removed_rows > 0 {
            tracing::info!(
                removed_rows,
                images = removed_images.len(),
                "removed rows of unrecognized famous images"
            );
        }

        RecognitionResult {
            trials,
            removed_images,
            removed_rows,
        }
    }
}

/// Restricts a dataset to presentation trials
pub struct TrialSelector;

impl TrialSelector {
    /// Keep rows with a presentation image; returns the kept rows and the drop count
    pub fn select(trials: Vec<TrialRecord>) -> (Vec<TrialRecord>, usize) {
        let before = trials.len();
        let selected: Vec<TrialRecord> = trials
            .into_iter()
            .filter(TrialRecord::is_presentation)
            .collect();

        let dropped = before - selected.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped probe rows");
        }

        (selected, dropped)
    }
}
