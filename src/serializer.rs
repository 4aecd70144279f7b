//! Tabular serialization
//!
//! Renders the trial section and the optional summary section into a single
//! comma-delimited document.

use crate::schema::{SUMMARY_COLUMNS, TRIAL_COLUMNS};
use crate::types::{SummaryRecord, TrialRecord};

const DELIMITER: char = ',';
const FIELD_SEPARATOR: &str = ",";
const QUOTE: char = '"';
const LINE_SEPARATOR: &str = "\n";

/// Serializer for the two-section output document
pub struct TabularSerializer;

impl TabularSerializer {
    /// Render trials, then a blank line and the summary when one exists.
    ///
    /// Lines are separated by `\n` with no trailing newline.
    pub fn render(trials: &[TrialRecord], summary: Option<&SummaryRecord>) -> String {
        let mut lines = Vec::with_capacity(trials.len() + 4);

        lines.push(render_line(TRIAL_COLUMNS.iter().copied()));
        for trial in trials {
            lines.push(render_line(trial_values(trial)));
        }

        if let Some(summary) = summary {
            lines.push(String::new());
            lines.push(render_line(SUMMARY_COLUMNS.iter().copied()));
            lines.push(render_line(summary.values()));
        }

        lines.join(LINE_SEPARATOR)
    }
}

/// Values of a trial in [`TRIAL_COLUMNS`] order
fn trial_values(trial: &TrialRecord) -> [&str; 14] {
    [
        &trial.participant,
        &trial.session,
        &trial.age,
        &trial.gender,
        &trial.test_image_id,
        &trial.race,
        &trial.is_famous,
        &trial.orientation,
        &trial.old_new,
        &trial.condition_label,
        &trial.response_key,
        &trial.response_rt,
        trial.outcome_str(),
        &trial.outcome_rt,
    ]
}

fn render_line<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Quote a field iff it contains a delimiter, a quote or a line break
pub fn escape_field(value: &str) -> String {
    if value.contains(&[DELIMITER, QUOTE, '\n', '\r'][..]) {
        let doubled = value.replace(QUOTE, "\"\"");
        format!("{QUOTE}{doubled}{QUOTE}")
    } else {
        value.to_string()
    }
}
