//! # Sheetsift - contact sheet cleaning and column extraction
//!
//! Sheetsift reads contact lists (CSV, TSV, XLSX, XLS), detects which columns
//! hold emails, phones, names and domains, then drops incomplete rows or
//! pulls out just the columns you need.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Sheet File  │────▶│   Parser    │────▶│   Detect    │────▶│   Session   │
//! │ (CSV/XLSX)  │     │  (auto-enc) │     │  (headers)  │     │  (mapping)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │   Export    │◀────│  Transform  │◀───────────┘
//!                     │ (CSV/XLSX)  │     │(clean/extr.)│
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetsift::{CleanRule, Config, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env();
//!     let session = Session::open("contacts.xlsx", None, &config).await.unwrap();
//!     let preview = session.clean_preview(CleanRule::EitherRequired).unwrap();
//!     println!("Keeping {} of {} rows", preview.keep_count, preview.total);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (ColumnType, ColumnMapping, CleanRule)
//! - [`config`] - Limits and defaults from the environment
//! - [`logs`] - Broadcast progress log
//! - [`parser`] - CSV/TSV and workbook parsing with auto-detection
//! - [`detect`] - Column type detection from headers
//! - [`transform`] - Cleaning, extraction and statistics
//! - [`export`] - CSV/TSV/XLSX/TXT serialization
//! - [`session`] - Mapping lifecycle over a loaded file

// Core modules
pub mod error;
pub mod models;
pub mod config;
pub mod logs;

// Parsing
pub mod parser;

// Detection
pub mod detect;

// Transformation
pub mod transform;

// Output
pub mod export;

// Session
pub mod session;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError, ExportResult, ParseError, ParseResult, SelectionError, SelectionResult,
    SessionError, SessionResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CleanRule, ColumnMapping, ColumnType, FileFormat, Row, SheetInfo};

// =============================================================================
// Re-exports - Config & Logs
// =============================================================================

pub use config::Config;
pub use logs::{LogEntry, LogLevel, LOG_BROADCASTER};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, list_sheets, load_file, load_sheet_list,
    parse_bytes, parse_workbook, ParsedData,
};

// =============================================================================
// Re-exports - Detection
// =============================================================================

pub use detect::{detect, detect_with_confidence, ColumnDetectionMap, Confidence, DetectionResult};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    available_rules, classify, compute_statistics, extract, is_empty_value, preview,
    CleanOutcome, CleanPreview, CleanReport, DataStatistics, Extraction, OutputShape,
    RuleAvailability, EMPTY_VALUES,
};

// =============================================================================
// Re-exports - Export & Session
// =============================================================================

pub use export::{
    download_filename, write_delimited, write_table, write_workbook, CleanOutputFormat,
    ExportFormat,
};
pub use session::{CleanExport, ExtractExport, Session, SessionSummary};
