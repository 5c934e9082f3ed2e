//! Dataset statistics shown alongside the preview.

use serde::Serialize;

use super::empty::is_empty_value;
use crate::models::{ColumnMapping, ColumnType, Row};

/// Row/column totals and email/phone fill counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatistics {
    pub total_rows: usize,
    pub total_columns: usize,
    pub email_count: usize,
    pub phone_count: usize,
    pub empty_email_count: usize,
    pub empty_phone_count: usize,
}

impl DataStatistics {
    /// Percentage of rows with an email, rounded, if the column is mapped.
    pub fn email_fill_percent(&self, mapping: &ColumnMapping) -> Option<u32> {
        mapping
            .is_mapped(ColumnType::Email)
            .then(|| percent(self.email_count, self.total_rows))
    }

    /// Percentage of rows with a phone, rounded, if the column is mapped.
    pub fn phone_fill_percent(&self, mapping: &ColumnMapping) -> Option<u32> {
        mapping
            .is_mapped(ColumnType::Phone)
            .then(|| percent(self.phone_count, self.total_rows))
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Count non-empty email/phone cells.
///
/// An unmapped column has a count of zero and every row counts as empty.
pub fn compute_statistics(
    headers: &[String],
    rows: &[Row],
    mapping: &ColumnMapping,
) -> DataStatistics {
    let filled = |column_type: ColumnType| -> usize {
        match mapping.get(column_type) {
            Some(header) => rows.iter().filter(|row| !is_empty_value(row.get(header))).count(),
            None => 0,
        }
    };

    let total_rows = rows.len();
    let email_count = filled(ColumnType::Email);
    let phone_count = filled(ColumnType::Phone);

    DataStatistics {
        total_rows,
        total_columns: headers.len(),
        email_count,
        phone_count,
        empty_email_count: total_rows - email_count,
        empty_phone_count: total_rows - phone_count,
    }
}
