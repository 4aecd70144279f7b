//! Row-by-row comparison of two tabular files
//!
//! Used to check a processed export against a reference produced elsewhere.

use serde::Serialize;

use crate::types::RawRow;

/// Rows compared when no limit is given
pub const DEFAULT_COMPARE_ROWS: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub field: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDifference {
    /// 1-based row number
    pub row: usize,
    /// Row exists in only one of the files
    pub missing: bool,
    pub fields: Vec<FieldDifference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub left_rows: usize,
    pub right_rows: usize,
    pub compared_left: usize,
    pub compared_right: usize,
    pub differences: Vec<RowDifference>,
}

impl ComparisonReport {
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty() && self.compared_left == self.compared_right
    }

    pub fn row_count_mismatch(&self) -> bool {
        self.compared_left != self.compared_right
    }
}

/// Compare the first `limit` rows of two row sets
pub fn compare_rows(left: &[RawRow], right: &[RawRow], limit: usize) -> ComparisonReport {
    let left_head = &left[..left.len().min(limit)];
    let right_head = &right[..right.len().min(limit)];

    let differences = (0..left_head.len().max(right_head.len()))
        .filter_map(|i| match (left_head.get(i), right_head.get(i)) {
            (Some(a), Some(b)) => {
                let fields = diff_fields(a, b);
                (!fields.is_empty()).then(|| RowDifference {
                    row: i + 1,
                    missing: false,
                    fields,
                })
            }
            _ => Some(RowDifference {
                row: i + 1,
                missing: true,
                fields: Vec::new(),
            }),
        })
        .collect();

    ComparisonReport {
        left_rows: left.len(),
        right_rows: right.len(),
        compared_left: left_head.len(),
        compared_right: right_head.len(),
        differences,
    }
}

/// Differing fields over the union of both rows' columns, first appearance order
fn diff_fields(left: &RawRow, right: &RawRow) -> Vec<FieldDifference> {
    let mut columns: Vec<&str> = left.keys().collect();
    for key in right.keys() {
        if !columns.contains(&key) {
            columns.push(key);
        }
    }

    columns
        .into_iter()
        .filter_map(|column| {
            let a = left.get(column);
            let b = right.get(column);
            (a != b).then(|| FieldDifference {
                field: column.to_string(),
                left: a.map(str::to_string),
                right: b.map(str::to_string),
            })
        })
        .collect()
}
