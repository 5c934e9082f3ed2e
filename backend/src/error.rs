//! Error types for the Sheetsift cleaning pipeline.
//!
//! - [`ParseError`] - File ingestion errors (CSV/TSV text, XLSX/XLS workbooks)
//! - [`SelectionError`] - Invalid rule, mapping or extraction selections
//! - [`ExportError`] - Serialization of cleaned/extracted data
//! - [`SessionError`] - Top-level errors wrapping all of the above
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::{CleanRule, ColumnType};

// =============================================================================
// Parsing Errors
// =============================================================================

/// Errors while turning a file into headers and rows.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Extension is not one of .csv, .tsv, .xlsx, .xls.
    #[error("Unsupported file type: '{0}' (expected .csv, .tsv, .xlsx or .xls)")]
    UnsupportedFileType(String),

    /// File has zero bytes.
    #[error("File is empty")]
    EmptyFile,

    /// File exceeds the configured size limit.
    #[error("File is {size} bytes, exceeding the maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Invalid CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Workbook could not be opened or read.
    #[error("Unable to read workbook: {0}")]
    Workbook(String),

    /// Requested sheet does not exist.
    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    /// No headers found.
    #[error("Could not detect column headers")]
    NoHeaders,

    /// Headers present but no data below them.
    #[error("The file contains no data rows")]
    NoDataRows,

    /// Background parse task failed to complete.
    #[error("Parse task failed: {0}")]
    Task(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        ParseError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Workbook(err.to_string())
    }
}

// =============================================================================
// Selection Errors
// =============================================================================

/// A caller asked for something the current mapping cannot satisfy.
///
/// These are logical preconditions, not transient failures: retrying with
/// the same inputs always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Cleaning rule needs a column that is not mapped.
    #[error("Rule '{rule}' is unavailable: required column not mapped")]
    RuleUnavailable { rule: CleanRule },

    /// Extraction selected no mapped column.
    #[error("Please select at least one mapped column to extract")]
    NoMappedColumns,

    /// Header is not part of the dataset.
    #[error("Unknown column header: '{0}'")]
    UnknownHeader(String),

    /// Header already assigned to another column type.
    #[error("Column '{header}' is already mapped to {column_type}")]
    HeaderInUse {
        header: String,
        column_type: ColumnType,
    },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced bytes that are not UTF-8.
    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Workbook writer failure.
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Data does not fit in a worksheet.
    #[error("Too many {0} for a worksheet")]
    SheetLimit(&'static str),
}

// =============================================================================
// Session Errors (top-level)
// =============================================================================

/// Top-level error returned by session operations and the CLI.
#[derive(Debug, Error)]
pub enum SessionError {
    /// File ingestion error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid selection.
    #[error("Invalid selection: {0}")]
    Selection(#[from] SelectionError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for selection-checked operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ParseError -> SessionError
        let parse_err = ParseError::NoDataRows;
        let session_err: SessionError = parse_err.into();
        assert!(session_err.to_string().contains("no data rows"));

        // SelectionError -> SessionError
        let sel_err = SelectionError::UnknownHeader("Fax".into());
        let session_err: SessionError = sel_err.into();
        assert!(session_err.to_string().contains("Fax"));
    }

    #[test]
    fn test_selection_error_format() {
        let err = SelectionError::HeaderInUse {
            header: "Contact".into(),
            column_type: ColumnType::Name,
        };
        let msg = err.to_string();
        assert!(msg.contains("Contact"));
        assert!(msg.contains("name"));

        let err = SelectionError::RuleUnavailable {
            rule: CleanRule::BothRequired,
        };
        assert!(err.to_string().contains("both_required"));
    }

    #[test]
    fn test_file_too_large_format() {
        let err = ParseError::FileTooLarge { size: 60, max: 50 };
        let msg = err.to_string();
        assert!(msg.contains("60"));
        assert!(msg.contains("50"));
    }
}
