//! Condition aggregation
//!
//! Computes, for each cell of the condition grid:
//! - Hit rate: HIT responses over old stimuli
//! - False-alarm rate: FA responses over new stimuli
//! - Mean reaction time over HIT trials
//!
//! Statistics are 2-decimal strings, empty when the denominator is zero.

use crate::schema::BOM;
use crate::types::{
    ConditionKey, ConditionStats, Outcome, SummaryRecord, TrialRecord, CONDITION_GRID,
};

/// Aggregator producing one summary per dataset
pub struct ConditionAggregator;

impl ConditionAggregator {
    /// Summarize selected presentation trials.
    ///
    /// Demographics come from the first trial. Returns `None` for an empty
    /// dataset.
    pub fn aggregate(trials: &[TrialRecord]) -> Option<SummaryRecord> {
        let first = trials.first()?;

        let cells = CONDITION_GRID
            .iter()
            .map(|key| compute_cell(trials, key))
            .collect();

        Some(SummaryRecord {
            participant: first.participant.clone(),
            session: first.session.clone(),
            age: first.age.clone(),
            gender: first.gender.clone(),
            cells,
        })
    }
}

fn compute_cell(trials: &[TrialRecord], key: &ConditionKey) -> ConditionStats {
    let matching: Vec<&TrialRecord> = trials.iter().filter(|t| key.matches(t)).collect();

    ConditionStats {
        key: *key,
        hit_rate: response_rate(&matching, "old", Outcome::Hit),
        false_alarm_rate: response_rate(&matching, "new", Outcome::FalseAlarm),
        mean_rt: mean_hit_rt(&matching),
    }
}

/// Share of `stimulus` trials that produced `outcome`
fn response_rate(trials: &[&TrialRecord], stimulus: &str, outcome: Outcome) -> String {
    let (hits, total) = trials
        .iter()
        .filter(|t| t.old_new == stimulus)
        .fold((0u64, 0u64), |(hits, total), t| {
            let hit = u64::from(t.outcome == Some(outcome));
            (hits + hit, total + 1)
        });

    if total == 0 {
        return String::new();
    }
    to_fixed2(hits as f64 / total as f64)
}

fn mean_hit_rt(trials: &[&TrialRecord]) -> String {
    let rts: Vec<f64> = trials
        .iter()
        .filter(|t| t.outcome == Some(Outcome::Hit))
        .filter_map(|t| parse_rt(&t.response_rt))
        .collect();

    if rts.is_empty() {
        return String::new();
    }
    let mean = rts.iter().sum::<f64>() / rts.len() as f64;
    to_fixed2(mean)
}

/// Read the longest numeric prefix of `value`, skipping leading whitespace.
///
/// `"0.5s"` reads as 0.5 and `"Infinity"` is accepted; `"inf"`, `"nan"` and
/// values without a leading number are not numeric.
pub fn parse_rt(value: &str) -> Option<f64> {
    let text = value.trim_start_matches(|c: char| c.is_whitespace() || c == BOM);
    let (sign, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };

    if unsigned.starts_with("Infinity") {
        return Some(sign * f64::INFINITY);
    }

    let bytes = unsigned.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits_from(0);
    let mut end = int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    unsigned[..end].parse::<f64>().ok().map(|v| sign * v)
}

/// Format `value` with two decimals the way JavaScript `toFixed(2)` does.
///
/// The exact binary value is rounded to hundredths with ties going up, so
/// 0.125 renders `0.13` while 3/40 (stored just below 0.075) renders `0.07`.
pub fn to_fixed2(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value < 0.0 {
        return format!("-{}", to_fixed2(-value));
    }
    if value.is_infinite() {
        return "Infinity".to_string();
    }
    if value >= 1e21 {
        return format!("{value}");
    }

    let bits = value.to_bits();
    let exponent_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = u128::from(bits & ((1u64 << 52) - 1));
    let (mantissa, exponent) = if exponent_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u128 << 52), exponent_bits - 1075)
    };

    // value * 100 == mantissa * 100 * 2^exponent, below 2^77 here
    let scaled = mantissa * 100;
    let hundredths = if exponent >= 0 {
        scaled << exponent
    } else if exponent < -100 {
        0
    } else {
        let shift = exponent.unsigned_abs();
        let whole = scaled >> shift;
        let remainder = scaled - (whole << shift);
        if remainder << 1 >= 1u128 << shift {
            whole + 1
        } else {
            whole
        }
    };

    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::OutcomeClassifier;
    use crate::types::{Familiarity, Orientation, Race};

    fn trial(
        race: &str,
        is_famous: &str,
        orientation: &str,
        old_new: &str,
        key: &str,
        rt: &str,
    ) -> TrialRecord {
        OutcomeClassifier::classify(TrialRecord {
            participant: "P01".to_string(),
            session: "1".to_string(),
            age: "23".to_string(),
            gender: "female".to_string(),
            test_image_id: "img.jpg".to_string(),
            race: race.to_string(),
            is_famous: is_famous.to_string(),
            orientation: orientation.to_string(),
            old_new: old_new.to_string(),
            response_key: key.to_string(),
            response_rt: rt.to_string(),
            ..Default::default()
        })
    }

    fn fnc() -> ConditionKey {
        ConditionKey::new(Familiarity::Famous, Orientation::Normal, Race::Caucasian)
    }

    #[test]
    fn test_empty_dataset_has_no_summary() {
        assert!(ConditionAggregator::aggregate(&[]).is_none());
    }

    #[test]
    fn test_rates_and_mean_rt() {
        let trials = vec![
            trial("caucasian", "famous", "normal", "old", "right", "0.50"),
            trial("caucasian", "famous", "normal", "old", "right", "0.70"),
            trial("caucasian", "famous", "normal", "old", "left", "0.90"),
            trial("caucasian", "famous", "normal", "new", "right", "0.40"),
            trial("caucasian", "famous", "normal", "new", "left", "0.30"),
            trial("caucasian", "famous", "normal", "new", "left", "0.30"),
            trial("caucasian", "famous", "normal", "new", "left", "0.30"),
        ];

        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        let cell = summary.cell(&fnc()).unwrap();

        assert_eq!(cell.hit_rate, "0.67");
        assert_eq!(cell.false_alarm_rate, "0.25");
        assert_eq!(cell.mean_rt, "0.60");
        assert_eq!(summary.participant, "P01");
        assert_eq!(summary.gender, "female");
        assert_eq!(summary.cells.len(), 8);
    }

    #[test]
    fn test_empty_denominators() {
        let trials = vec![trial("afrikan", "unknown", "flipped", "new", "left", "0.5")];
        let summary = ConditionAggregator::aggregate(&trials).unwrap();

        let ula = ConditionKey::new(Familiarity::Unknown, Orientation::Flipped, Race::Afrikan);
        let cell = summary.cell(&ula).unwrap();
        assert_eq!(cell.hit_rate, "");
        assert_eq!(cell.false_alarm_rate, "0.00");
        assert_eq!(cell.mean_rt, "");

        // Cells without any trial are fully empty
        let other = summary.cell(&fnc()).unwrap();
        assert_eq!(
            (other.hit_rate.as_str(), other.false_alarm_rate.as_str(), other.mean_rt.as_str()),
            ("", "", "")
        );
    }

    #[test]
    fn test_non_numeric_rt_is_excluded() {
        let trials = vec![
            trial("caucasian", "famous", "normal", "old", "right", "n/a"),
            trial("caucasian", "famous", "normal", "old", "right", "1.25"),
        ];
        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        assert_eq!(summary.cell(&fnc()).unwrap().mean_rt, "1.25");

        let only_bad = vec![trial("caucasian", "famous", "normal", "old", "right", "")];
        let summary = ConditionAggregator::aggregate(&only_bad).unwrap();
        let cell = summary.cell(&fnc()).unwrap();
        assert_eq!(cell.hit_rate, "1.00");
        assert_eq!(cell.mean_rt, "");
    }

    #[test]
    fn test_values_match_grid_order() {
        let trials = vec![trial("afrikan", "famous", "normal", "old", "right", "0.8")];
        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        let values = summary.values();

        assert_eq!(values.len(), crate::schema::SUMMARY_COLUMNS.len());
        // FNA is the second cell
        assert_eq!(&values[7..10], &["1.00", "", "0.80"]);
    }

    #[test]
    fn test_to_fixed2_rounds_binary_value() {
        assert_eq!(to_fixed2(1.0 / 8.0), "0.13");
        assert_eq!(to_fixed2(3.0 / 8.0), "0.38");
        assert_eq!(to_fixed2(2.0 / 3.0), "0.67");
        assert_eq!(to_fixed2(0.0), "0.00");
        assert_eq!(to_fixed2(1.0), "1.00");
        assert_eq!(to_fixed2(0.625), "0.63");
        // Stored just below the decimal tie
        assert_eq!(to_fixed2(3.0 / 40.0), "0.07");
        assert_eq!(to_fixed2(7.0 / 40.0), "0.17");
        assert_eq!(to_fixed2(29.0 / 200.0), "0.14");
        assert_eq!(to_fixed2(1.005), "1.00");
        assert_eq!(to_fixed2(12.5), "12.50");
        assert_eq!(to_fixed2(-0.125), "-0.13");
        assert_eq!(to_fixed2(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_hit_rate_of_forty_old_trials() {
        let mut trials: Vec<TrialRecord> = (0..3)
            .map(|_| trial("caucasian", "famous", "normal", "old", "right", ""))
            .collect();
        trials.extend((0..37).map(|_| trial("caucasian", "famous", "normal", "old", "left", "")));

        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        assert_eq!(summary.cell(&fnc()).unwrap().hit_rate, "0.07");
    }

    #[test]
    fn test_mean_rt_tie_rounds_up() {
        let trials = vec![trial("caucasian", "famous", "normal", "old", "right", "0.125")];
        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        assert_eq!(summary.cell(&fnc()).unwrap().mean_rt, "0.13");
    }

    #[test]
    fn test_rt_with_unit_suffix_uses_numeric_prefix() {
        let trials = vec![trial("caucasian", "famous", "normal", "old", "right", "0.5s")];
        let summary = ConditionAggregator::aggregate(&trials).unwrap();
        assert_eq!(summary.cell(&fnc()).unwrap().mean_rt, "0.50");
    }

    #[test]
    fn test_parse_rt_prefixes() {
        assert_eq!(parse_rt(" 0.5"), Some(0.5));
        assert_eq!(parse_rt("0.5s"), Some(0.5));
        assert_eq!(parse_rt(".75"), Some(0.75));
        assert_eq!(parse_rt("3."), Some(3.0));
        assert_eq!(parse_rt("-1.5e2ms"), Some(-150.0));
        assert_eq!(parse_rt("2e"), Some(2.0));
        assert_eq!(parse_rt("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_rt("inf"), None);
        assert_eq!(parse_rt("infinity"), None);
        assert_eq!(parse_rt("NaN"), None);
        assert_eq!(parse_rt("."), None);
        assert_eq!(parse_rt("n/a"), None);
        assert_eq!(parse_rt(""), None);
    }
}
