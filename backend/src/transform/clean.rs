//! Row cleaning by email/phone completeness.
//!
//! Each row is reduced to two flags, `email_empty` and `phone_empty`, and the
//! selected [`CleanRule`] decides keep or drop:
//!
//! | rule              | keep when                        |
//! |-------------------|----------------------------------|
//! | `email_required`  | email present                    |
//! | `phone_required`  | phone present                    |
//! | `both_required`   | email present AND phone present  |
//! | `either_required` | email present OR phone present   |
//!
//! An unmapped column counts as empty in every row.

use serde::Serialize;

use super::empty::is_empty_value;
use crate::error::{SelectionError, SelectionResult};
use crate::models::{CleanRule, ColumnMapping, ColumnType, Row};

impl CleanRule {
    /// Decision table for one row.
    pub fn keeps(&self, email_empty: bool, phone_empty: bool) -> bool {
        match self {
            CleanRule::EmailRequired => !email_empty,
            CleanRule::PhoneRequired => !phone_empty,
            CleanRule::BothRequired => !email_empty && !phone_empty,
            CleanRule::EitherRequired => !email_empty || !phone_empty,
        }
    }

    /// Whether the mapping has the column(s) this rule needs.
    pub fn is_available(&self, mapping: &ColumnMapping) -> bool {
        let email = mapping.is_mapped(ColumnType::Email);
        let phone = mapping.is_mapped(ColumnType::Phone);
        match self {
            CleanRule::EmailRequired => email,
            CleanRule::PhoneRequired => phone,
            CleanRule::BothRequired => email && phone,
            CleanRule::EitherRequired => email || phone,
        }
    }
}

/// A rule and whether it can be selected under the current mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleAvailability {
    pub rule: CleanRule,
    pub label: &'static str,
    pub description: &'static str,
    pub available: bool,
}

/// All rules in declaration order with their availability.
pub fn available_rules(mapping: &ColumnMapping) -> Vec<RuleAvailability> {
    CleanRule::ALL
        .into_iter()
        .map(|rule| RuleAvailability {
            rule,
            label: rule.label(),
            description: rule.description(),
            available: rule.is_available(mapping),
        })
        .collect()
}

/// Reject a rule whose required column(s) are unmapped.
pub fn validate_rule(rule: CleanRule, mapping: &ColumnMapping) -> SelectionResult<()> {
    if rule.is_available(mapping) {
        Ok(())
    } else {
        Err(SelectionError::RuleUnavailable { rule })
    }
}

/// Whether `rule` keeps `row`.
pub fn keeps_row(row: &Row, mapping: &ColumnMapping, rule: CleanRule) -> bool {
    let empty = |column_type: ColumnType| -> bool {
        match mapping.get(column_type) {
            Some(header) => is_empty_value(row.get(header)),
            None => true,
        }
    };
    rule.keeps(empty(ColumnType::Email), empty(ColumnType::Phone))
}

// =============================================================================
// Classification
// =============================================================================

/// Rows split into kept and removed, each in original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanOutcome {
    pub total: usize,
    pub kept: Vec<Row>,
    pub removed: Vec<Row>,
}

impl CleanOutcome {
    pub fn kept_count(&self) -> usize {
        self.kept.len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn preview(&self) -> CleanPreview {
        CleanPreview {
            total: self.total,
            keep_count: self.kept_count(),
            remove_count: self.removed_count(),
        }
    }
}

/// Counts only, for showing the effect of a rule before committing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanPreview {
    pub total: usize,
    pub keep_count: usize,
    pub remove_count: usize,
}

impl CleanPreview {
    /// Share of rows kept, 0.0 to 1.0. An empty dataset keeps nothing.
    pub fn keep_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.keep_count as f64 / self.total as f64
        }
    }
}

/// Partition `rows` with `rule`.
///
/// Fails before looking at any row if the rule is unavailable. Zero rows
/// yield an empty outcome, not an error.
pub fn classify(
    rows: &[Row],
    mapping: &ColumnMapping,
    rule: CleanRule,
) -> SelectionResult<CleanOutcome> {
    validate_rule(rule, mapping)?;

    let (kept, removed): (Vec<Row>, Vec<Row>) = rows
        .iter()
        .cloned()
        .partition(|row| keeps_row(row, mapping, rule));

    Ok(CleanOutcome {
        total: rows.len(),
        kept,
        removed,
    })
}

/// Count what [`classify`] would keep without copying rows.
pub fn preview(
    rows: &[Row],
    mapping: &ColumnMapping,
    rule: CleanRule,
) -> SelectionResult<CleanPreview> {
    validate_rule(rule, mapping)?;

    let keep_count = rows
        .iter()
        .filter(|row| keeps_row(row, mapping, rule))
        .count();

    Ok(CleanPreview {
        total: rows.len(),
        keep_count,
        remove_count: rows.len() - keep_count,
    })
}

/// Totals reported after a cleaned export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    pub original_row_count: usize,
    pub cleaned_row_count: usize,
    pub removed_row_count: usize,
}

impl From<&CleanOutcome> for CleanReport {
    fn from(outcome: &CleanOutcome) -> Self {
        CleanReport {
            original_row_count: outcome.total,
            cleaned_row_count: outcome.kept_count(),
            removed_row_count: outcome.removed_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row(json!({ "e": "a@x.com", "p": "" })),
            row(json!({ "e": "", "p": "555" })),
            row(json!({ "e": "", "p": "" })),
        ]
    }

    fn email_phone_mapping() -> ColumnMapping {
        ColumnMapping {
            email: Some("e".into()),
            phone: Some("p".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            // (email_empty, phone_empty) -> [email, phone, both, either]
            ((false, false), [true, true, true, true]),
            ((false, true), [true, false, false, true]),
            ((true, false), [false, true, false, true]),
            ((true, true), [false, false, false, false]),
        ];

        for ((email_empty, phone_empty), expected) in cases {
            for (rule, keep) in CleanRule::ALL.into_iter().zip(expected) {
                assert_eq!(
                    rule.keeps(email_empty, phone_empty),
                    keep,
                    "{} with email_empty={} phone_empty={}",
                    rule,
                    email_empty,
                    phone_empty
                );
            }
        }
    }

    #[test]
    fn test_either_required_scenario() {
        let rows = sample_rows();
        let outcome = classify(&rows, &email_phone_mapping(), CleanRule::EitherRequired).unwrap();

        assert_eq!(outcome.kept_count(), 2);
        assert_eq!(outcome.removed_count(), 1);
        assert_eq!(outcome.kept[0]["e"], "a@x.com");
        assert_eq!(outcome.kept[1]["p"], "555");
        assert_eq!(outcome.removed[0], rows[2]);
    }

    #[test]
    fn test_both_required_scenario() {
        let rows = sample_rows();
        let outcome = classify(&rows, &email_phone_mapping(), CleanRule::BothRequired).unwrap();

        assert_eq!(outcome.kept_count(), 0);
        assert_eq!(outcome.removed_count(), 3);
        assert_eq!(outcome.total, 3);
    }

    #[test]
    fn test_counts_add_up_and_order_kept() {
        let rows: Vec<Row> = (0..20)
            .map(|i| {
                let email = if i % 3 == 0 { json!("N/A") } else { json!(format!("u{}@x.com", i)) };
                row(json!({ "e": email, "p": i, "idx": i }))
            })
            .collect();
        let mapping = email_phone_mapping();

        for rule in CleanRule::ALL {
            let outcome = classify(&rows, &mapping, rule).unwrap();
            assert_eq!(outcome.kept_count() + outcome.removed_count(), outcome.total);

            let indices: Vec<i64> = outcome
                .kept
                .iter()
                .map(|r| r["idx"].as_i64().unwrap())
                .collect();
            let mut sorted = indices.clone();
            sorted.sort();
            assert_eq!(indices, sorted);
        }
    }

    #[test]
    fn test_unavailable_rule_rejected() {
        let mapping = ColumnMapping {
            email: Some("e".into()),
            ..Default::default()
        };
        let rows = sample_rows();

        assert_eq!(
            classify(&rows, &mapping, CleanRule::BothRequired),
            Err(SelectionError::RuleUnavailable { rule: CleanRule::BothRequired })
        );
        assert!(preview(&rows, &mapping, CleanRule::PhoneRequired).is_err());
        assert!(classify(&rows, &mapping, CleanRule::EitherRequired).is_ok());
    }

    #[test]
    fn test_availability() {
        let none = ColumnMapping::empty();
        assert!(available_rules(&none).iter().all(|r| !r.available));

        let phone_only = ColumnMapping {
            phone: Some("p".into()),
            ..Default::default()
        };
        let available: Vec<CleanRule> = available_rules(&phone_only)
            .into_iter()
            .filter(|r| r.available)
            .map(|r| r.rule)
            .collect();
        assert_eq!(available, vec![CleanRule::PhoneRequired, CleanRule::EitherRequired]);
    }

    #[test]
    fn test_unmapped_phone_counts_as_empty() {
        let mapping = ColumnMapping {
            email: Some("e".into()),
            ..Default::default()
        };
        let rows = sample_rows();
        let outcome = classify(&rows, &mapping, CleanRule::EitherRequired).unwrap();
        assert_eq!(outcome.kept_count(), 1);
    }

    #[test]
    fn test_missing_cell_is_empty() {
        let rows = vec![row(json!({ "p": "555" }))];
        let outcome = classify(&rows, &email_phone_mapping(), CleanRule::EmailRequired).unwrap();
        assert_eq!(outcome.kept_count(), 0);
    }

    #[test]
    fn test_empty_dataset() {
        let outcome = classify(&[], &email_phone_mapping(), CleanRule::BothRequired).unwrap();
        assert_eq!(outcome, CleanOutcome::default());

        let preview = preview(&[], &email_phone_mapping(), CleanRule::EitherRequired).unwrap();
        assert_eq!(preview.total, 0);
        assert_eq!(preview.keep_ratio(), 0.0);
    }

    #[test]
    fn test_preview_matches_classify() {
        let rows = sample_rows();
        let mapping = email_phone_mapping();
        for rule in CleanRule::ALL {
            let counted = preview(&rows, &mapping, rule).unwrap();
            let outcome = classify(&rows, &mapping, rule).unwrap();
            assert_eq!(counted, outcome.preview());
        }
    }

    #[test]
    fn test_report_from_outcome() {
        let outcome =
            classify(&sample_rows(), &email_phone_mapping(), CleanRule::EmailRequired).unwrap();
        let report = CleanReport::from(&outcome);
        assert_eq!(report.original_row_count, 3);
        assert_eq!(report.cleaned_row_count, 1);
        assert_eq!(report.removed_row_count, 2);

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["cleanedRowCount"], 1);
    }
}
