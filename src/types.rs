//! Core types for the Trial Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw rows, canonical trial records, condition keys and the
//! per-participant summary.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A raw record as produced by a tabular source.
///
/// Columns keep their source order so that fuzzy lookups resolve to the first
/// matching column deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: IndexMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs, later duplicates overwrite earlier ones
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Set a column; an existing column keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Exact-key lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Signal-detection outcome of a presentation trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "HIT")]
    Hit,
    #[serde(rename = "FA")]
    FalseAlarm,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Hit => "HIT",
            Outcome::FalseAlarm => "FA",
        }
    }
}

/// Canonical per-trial record.
///
/// Absent values are empty strings. A presentation trial has `test_image_id`
/// set, a probe trial has `ask_image_id` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub participant: String,
    pub session: String,
    pub age: String,
    pub gender: String,
    pub test_image_id: String,
    pub ask_image_id: String,
    pub race: String,
    pub is_famous: String,
    pub orientation: String,
    pub old_new: String,
    pub response_key: String,
    pub response_rt: String,
    pub correct_option: String,
    pub familiarity_response: String,
    /// Derived by the outcome classifier
    pub outcome: Option<Outcome>,
    pub condition_label: String,
    pub outcome_rt: String,
}

impl TrialRecord {
    pub fn is_presentation(&self) -> bool {
        !self.test_image_id.is_empty()
    }

    /// The stimulus this row refers to, whichever trial role it plays
    pub fn image_id(&self) -> &str {
        if self.test_image_id.is_empty() {
            &self.ask_image_id
        } else {
            &self.test_image_id
        }
    }

    pub fn outcome_str(&self) -> &'static str {
        self.outcome.map(|o| o.as_str()).unwrap_or("")
    }
}

/// Racial category axis of the condition grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Caucasian,
    Afrikan,
}

impl Race {
    pub fn as_str(&self) -> &'static str {
        match self {
            Race::Caucasian => "caucasian",
            Race::Afrikan => "afrikan",
        }
    }

    pub fn code(&self) -> char {
        match self {
            Race::Caucasian => 'C',
            Race::Afrikan => 'A',
        }
    }
}

/// Familiarity axis of the condition grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Familiarity {
    Famous,
    Unknown,
}

impl Familiarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Familiarity::Famous => "famous",
            Familiarity::Unknown => "unknown",
        }
    }

    pub fn code(&self) -> char {
        match self {
            Familiarity::Famous => 'F',
            Familiarity::Unknown => 'U',
        }
    }
}

/// Orientation axis of the condition grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Normal,
    Flipped,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Normal => "normal",
            Orientation::Flipped => "flipped",
        }
    }

    pub fn code(&self) -> char {
        match self {
            Orientation::Normal => 'N',
            Orientation::Flipped => 'L',
        }
    }
}

/// One cell of the 2x2x2 condition grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionKey {
    pub race: Race,
    pub familiarity: Familiarity,
    pub orientation: Orientation,
}

impl ConditionKey {
    pub const fn new(familiarity: Familiarity, orientation: Orientation, race: Race) -> Self {
        Self {
            race,
            familiarity,
            orientation,
        }
    }

    /// Three-letter code: familiarity, orientation, race (e.g. `FLC`)
    pub fn code(&self) -> String {
        [
            self.familiarity.code(),
            self.orientation.code(),
            self.race.code(),
        ]
        .iter()
        .collect()
    }

    pub fn matches(&self, trial: &TrialRecord) -> bool {
        trial.race == self.race.as_str()
            && trial.is_famous == self.familiarity.as_str()
            && trial.orientation == self.orientation.as_str()
    }
}

/// The condition grid in output order: familiarity x orientation x race
pub const CONDITION_GRID: [ConditionKey; 8] = [
    ConditionKey::new(Familiarity::Famous, Orientation::Normal, Race::Caucasian),
    ConditionKey::new(Familiarity::Famous, Orientation::Normal, Race::Afrikan),
    ConditionKey::new(Familiarity::Famous, Orientation::Flipped, Race::Caucasian),
    ConditionKey::new(Familiarity::Famous, Orientation::Flipped, Race::Afrikan),
    ConditionKey::new(Familiarity::Unknown, Orientation::Normal, Race::Caucasian),
    ConditionKey::new(Familiarity::Unknown, Orientation::Normal, Race::Afrikan),
    ConditionKey::new(Familiarity::Unknown, Orientation::Flipped, Race::Caucasian),
    ConditionKey::new(Familiarity::Unknown, Orientation::Flipped, Race::Afrikan),
];

/// Statistics for one condition cell, each a 2-decimal string or empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionStats {
    pub key: ConditionKey,
    pub hit_rate: String,
    pub false_alarm_rate: String,
    pub mean_rt: String,
}

/// Per-participant summary, cells in [`CONDITION_GRID`] order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub participant: String,
    pub session: String,
    pub age: String,
    pub gender: String,
    pub cells: Vec<ConditionStats>,
}

impl SummaryRecord {
    /// Values in the order of [`crate::schema::SUMMARY_COLUMNS`]
    pub fn values(&self) -> Vec<&str> {
        let mut values = vec![
            self.participant.as_str(),
            self.session.as_str(),
            self.age.as_str(),
            self.gender.as_str(),
        ];
        for cell in &self.cells {
            values.push(&cell.hit_rate);
            values.push(&cell.false_alarm_rate);
            values.push(&cell.mean_rt);
        }
        values
    }

    pub fn cell(&self, key: &ConditionKey) -> Option<&ConditionStats> {
        self.cells.iter().find(|c| c.key == *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_codes() {
        let key = ConditionKey::new(Familiarity::Famous, Orientation::Flipped, Race::Caucasian);
        assert_eq!(key.code(), "FLC");

        let codes: Vec<String> = CONDITION_GRID.iter().map(|k| k.code()).collect();
        assert_eq!(
            codes,
            vec!["FNC", "FNA", "FLC", "FLA", "UNC", "UNA", "ULC", "ULA"]
        );
    }

    #[test]
    fn test_raw_row_keeps_column_order() {
        let mut row = RawRow::from_pairs([("b", "1"), ("a", "2")]);
        row.insert("b", "3");
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(row.get("b"), Some("3"));
        assert_eq!(row.get("c"), None);
    }

    #[test]
    fn test_raw_row_serializes_in_order() {
        let row = RawRow::from_pairs([("zeta", "1"), ("alpha", "x,y")]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"x,y"}"#);

        let parsed: RawRow = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_raw_row_duplicate_column_overwrites_in_place() {
        let row = RawRow::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_image_id_prefers_presentation() {
        let probe = TrialRecord {
            ask_image_id: "img7.jpg".to_string(),
            ..Default::default()
        };
        assert!(!probe.is_presentation());
        assert_eq!(probe.image_id(), "img7.jpg");

        let presentation = TrialRecord {
            test_image_id: "img3.jpg".to_string(),
            ..Default::default()
        };
        assert!(presentation.is_presentation());
        assert_eq!(presentation.image_id(), "img3.jpg");
    }
}
