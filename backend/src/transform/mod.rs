//! Row transformations over parsed data.
//!
//! This module holds the pure, synchronous part of the pipeline:
//! - Empty: the emptiness vocabulary shared by every rule
//! - Clean: keep/drop rows by email/phone completeness
//! - Extract: project rows onto detected column types
//! - Stats: fill counts for the preview
//!
//! None of these functions mutate their input; each returns new collections.

pub mod clean;
pub mod empty;
pub mod extract;
pub mod stats;

pub use clean::{
    available_rules, classify, keeps_row, preview, validate_rule, CleanOutcome, CleanPreview,
    CleanReport, RuleAvailability,
};
pub use empty::{cell_text, is_empty_value, optional_cell_text, EMPTY_VALUES};
pub use extract::{extract, resolve_columns, Extraction, OutputShape};
pub use stats::{compute_statistics, DataStatistics};
