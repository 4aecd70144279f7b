//! Output naming

use std::path::Path;

use crate::types::TrialRecord;

/// Derives output base names from participant demographics
pub struct OutputNamer;

impl OutputNamer {
    /// `{participant}_{gender}-{session}` when all three are set on the first
    /// retained trial, otherwise the input's file stem.
    pub fn base_name(first: Option<&TrialRecord>, input_name: &str) -> String {
        match first {
            Some(t) if !t.participant.is_empty() && !t.gender.is_empty() && !t.session.is_empty() => {
                format!("{}_{}-{}", t.participant, t.gender, t.session)
            }
            _ => {
                if let Some(t) = first {
                    tracing::warn!(
                        participant = %t.participant,
                        gender = %t.gender,
                        session = %t.session,
                        "missing naming fields, using input name"
                    );
                }
                input_stem(input_name)
            }
        }
    }

    /// Base name plus the output extension
    pub fn file_name(first: Option<&TrialRecord>, input_name: &str) -> String {
        format!(
            "{}.{}",
            Self::base_name(first, input_name),
            crate::schema::OUTPUT_EXTENSION
        )
    }
}

fn input_stem(input_name: &str) -> String {
    Path::new(input_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_name.to_string())
}
