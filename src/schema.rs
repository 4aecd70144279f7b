//! Column tables for the input and output documents
//!
//! The aggregator and the serializer share these tables so that header order
//! and value order stay in lock-step.

/// Header candidates for the gender column, in priority order
pub const GENDER_COLUMN_CANDIDATES: [&str; 2] = ["female=\"1\", male=\"2\"", "female=\"1\""];

/// Leading byte-order marker some exporters prepend to the first header
pub const BOM: char = '\u{feff}';

// Source column names
pub const COL_PARTICIPANT: &str = "participant";
pub const COL_SESSION: &str = "session";
pub const COL_AGE: &str = "age";
pub const COL_TEST_IMAGE: &str = "faceTesting";
pub const COL_ASK_IMAGE: &str = "faceAsking";
pub const COL_RACE: &str = "race";
pub const COL_IS_FAMOUS: &str = "isFamous";
pub const COL_ORIENTATION: &str = "orientation";
pub const COL_OLD_NEW: &str = "oldnew";
pub const COL_RESPONSE_KEY: &str = "testkeys.keys";
pub const COL_RESPONSE_RT: &str = "testkeys.rt";
pub const COL_CORRECT_OPTION: &str = "correctOption";
pub const COL_FAMILIARITY: &str = "familiarnessKeys.keys";

/// Trial section header. Probe-only columns are left out.
pub const TRIAL_COLUMNS: [&str; 14] = [
    "participant",
    "session",
    "age",
    "gender",
    "faceTesting",
    "race",
    "isFamous",
    "orientation",
    "oldnew",
    "condition",
    "testkeys.keys",
    "testkeys.rt",
    "HIT_FA",
    "HIT_rt",
];

/// Summary section header: demographics then `{code}_HIT`, `{code}_FA`,
/// `{code}_m_rt` for every cell of [`crate::types::CONDITION_GRID`]
pub const SUMMARY_COLUMNS: [&str; 28] = [
    "participant",
    "session",
    "age",
    "gender",
    "FNC_HIT",
    "FNC_FA",
    "FNC_m_rt",
    "FNA_HIT",
    "FNA_FA",
    "FNA_m_rt",
    "FLC_HIT",
    "FLC_FA",
    "FLC_m_rt",
    "FLA_HIT",
    "FLA_FA",
    "FLA_m_rt",
    "UNC_HIT",
    "UNC_FA",
    "UNC_m_rt",
    "UNA_HIT",
    "UNA_FA",
    "UNA_m_rt",
    "ULC_HIT",
    "ULC_FA",
    "ULC_m_rt",
    "ULA_HIT",
    "ULA_FA",
    "ULA_m_rt",
];

/// Extension of every output document
pub const OUTPUT_EXTENSION: &str = "csv";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CONDITION_GRID;

    #[test]
    fn test_summary_columns_follow_grid() {
        let mut expected: Vec<String> = SUMMARY_COLUMNS[..4].iter().map(|s| s.to_string()).collect();
        for key in CONDITION_GRID.iter() {
            let code = key.code();
            expected.push(format!("{code}_HIT"));
            expected.push(format!("{code}_FA"));
            expected.push(format!("{code}_m_rt"));
        }
        assert_eq!(SUMMARY_COLUMNS.to_vec(), expected);
    }
}
