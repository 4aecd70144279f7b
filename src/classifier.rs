//! Outcome classification
//!
//! Derives the per-trial fields that depend only on the normalized record:
//! - Signal-detection outcome (HIT / FA)
//! - Human-readable condition label
//! - Reaction time kept for HIT trials only

use crate::types::{Outcome, TrialRecord};

const RESPONSE_RIGHT: &str = "right";
const STIMULUS_OLD: &str = "old";
const STIMULUS_NEW: &str = "new";
const LABEL_SEPARATOR: &str = " | ";

/// Classifier attaching derived fields to normalized trial records
pub struct OutcomeClassifier;

impl OutcomeClassifier {
    /// Attach outcome, condition label and outcome RT
    pub fn classify(mut record: TrialRecord) -> TrialRecord {
        record.outcome = classify_outcome(&record);
        record.condition_label = build_condition_label(&record);
        record.outcome_rt = match record.outcome {
            Some(Outcome::Hit) => record.response_rt.clone(),
            _ => String::new(),
        };
        record
    }
}

/// HIT for a "right" response to an old stimulus, FA for one to a new stimulus
pub fn classify_outcome(record: &TrialRecord) -> Option<Outcome> {
    if record.response_key != RESPONSE_RIGHT {
        return None;
    }

    match record.old_new.as_str() {
        STIMULUS_OLD => Some(Outcome::Hit),
        STIMULUS_NEW => Some(Outcome::FalseAlarm),
        _ => None,
    }
}

/// Join the non-blank condition axes in fixed order
pub fn build_condition_label(record: &TrialRecord) -> String {
    [
        record.race.as_str(),
        record.is_famous.as_str(),
        record.orientation.as_str(),
        record.old_new.as_str(),
    ]
    .iter()
    .filter(|part| !part.trim().is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(LABEL_SEPARATOR)
}
