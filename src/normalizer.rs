//! Row normalization
//!
//! This module maps heterogeneous raw rows onto the canonical [`TrialRecord`].
//! All fuzzy header handling lives here:
//! - Gender column detection against a fixed list of header variants
//! - Numeric gender codes mapped to labels
//! - Lookups tolerant of a leading byte-order marker and of header case

use crate::schema::{
    BOM, COL_AGE, COL_ASK_IMAGE, COL_CORRECT_OPTION, COL_FAMILIARITY, COL_IS_FAMOUS,
    COL_OLD_NEW, COL_ORIENTATION, COL_PARTICIPANT, COL_RACE, COL_RESPONSE_KEY, COL_RESPONSE_RT,
    COL_SESSION, COL_TEST_IMAGE, GENDER_COLUMN_CANDIDATES,
};
use crate::types::{RawRow, TrialRecord};

/// Normalizer for converting raw rows of one dataset to trial records
#[derive(Debug, Clone, Default)]
pub struct RowNormalizer {
    gender_column: Option<String>,
}

impl RowNormalizer {
    /// Create a normalizer with the gender column resolved against the first row
    pub fn for_dataset(rows: &[RawRow]) -> Self {
        let gender_column = rows
            .first()
            .and_then(find_gender_column)
            .map(str::to_string);

        if gender_column.is_none() {
            tracing::warn!("no gender column found, gender will be left empty");
        }

        Self { gender_column }
    }

    /// Create a normalizer with an already resolved gender column
    pub fn with_gender_column(gender_column: Option<String>) -> Self {
        Self { gender_column }
    }

    pub fn gender_column(&self) -> Option<&str> {
        self.gender_column.as_deref()
    }

    /// Normalize one raw row. Derived fields are left for the classifier.
    pub fn normalize(&self, row: &RawRow) -> TrialRecord {
        let gender = self
            .gender_column
            .as_deref()
            .and_then(|column| row.get(column))
            .map(convert_gender)
            .unwrap_or_default();

        TrialRecord {
            participant: lookup(row, COL_PARTICIPANT).to_string(),
            session: lookup(row, COL_SESSION).to_string(),
            age: lookup(row, COL_AGE).to_string(),
            gender,
            test_image_id: lookup(row, COL_TEST_IMAGE).to_string(),
            ask_image_id: lookup(row, COL_ASK_IMAGE).to_string(),
            race: lookup(row, COL_RACE).to_string(),
            is_famous: lookup(row, COL_IS_FAMOUS).to_string(),
            orientation: lookup(row, COL_ORIENTATION).to_string(),
            old_new: lookup(row, COL_OLD_NEW).to_string(),
            response_key: lookup(row, COL_RESPONSE_KEY).to_string(),
            response_rt: lookup(row, COL_RESPONSE_RT).to_string(),
            correct_option: lookup(row, COL_CORRECT_OPTION).to_string(),
            familiarity_response: lookup(row, COL_FAMILIARITY).to_string(),
            ..Default::default()
        }
    }
}

/// Find the gender header among the known variants (exact match, first wins)
pub fn find_gender_column(row: &RawRow) -> Option<&'static str> {
    GENDER_COLUMN_CANDIDATES
        .iter()
        .copied()
        .find(|name| row.contains_key(name))
}

/// Map the numeric gender code to a label; unknown values pass through trimmed
pub fn convert_gender(value: &str) -> String {
    match value.trim() {
        "1" => "female".to_string(),
        "2" => "male".to_string(),
        other => other.to_string(),
    }
}

/// Tolerant column lookup: exact, then BOM-prefixed, then case-insensitive
/// ignoring a leading BOM. Missing columns read as empty.
pub fn lookup<'a>(row: &'a RawRow, column: &str) -> &'a str {
    if let Some(value) = row.get(column) {
        return value;
    }

    let bom_column = format!("{BOM}{column}");
    if let Some(value) = row.get(&bom_column) {
        return value;
    }

    row.iter()
        .find(|(key, _)| key.trim_start_matches(BOM).to_lowercase() == column.to_lowercase())
        .map(|(_, value)| value)
        .unwrap_or("")
}
