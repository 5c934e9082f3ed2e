//! File ingestion: CSV/TSV text and XLSX/XLS workbooks to headers + rows.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ .csv / .tsv │────▶│ encoding + delim │────▶│  csv reader  │──┐  │              │
//! └─────────────┘     └──────────────────┘     └──────────────┘  ├─▶│  ParsedData  │
//! ┌─────────────┐     ┌──────────────────┐                       │  │ (+ detected) │
//! │ .xlsx/.xls  │────▶│ calamine (sheet) │───────────────────────┘  │              │
//! └─────────────┘     └──────────────────┘                          └──────────────┘
//! ```
//!
//! Headers are trimmed and de-duplicated here so the detector can treat them
//! as unique. Cell values are kept as read (not trimmed).

pub mod workbook;

use encoding_rs::Encoding;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::detect::detect;
use crate::error::{ParseError, ParseResult};
use crate::logs::{log_info, log_success};
use crate::models::{ColumnMapping, FileFormat, Row, SheetInfo};

pub use workbook::{list_sheets, parse_workbook};

/// Headers and rows read from a file, with the mapping detected on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedData {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub total_rows: usize,
    pub format: FileFormat,
    /// Detected text encoding (CSV/TSV only).
    pub encoding: Option<String>,
    /// Field delimiter (CSV/TSV only).
    pub delimiter: Option<char>,
    /// Sheet the rows came from (workbooks only).
    pub sheet: Option<String>,
    pub detected_mapping: ColumnMapping,
}

// =============================================================================
// File validation
// =============================================================================

/// Format for a path, from its extension.
pub fn format_for_path(path: &Path) -> ParseResult<FileFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    FileFormat::from_extension(ext)
        .ok_or_else(|| ParseError::UnsupportedFileType(format!(".{}", ext)))
}

/// Reject empty and oversized files.
pub fn check_size(size: u64, config: &Config) -> ParseResult<()> {
    if size == 0 {
        return Err(ParseError::EmptyFile);
    }
    if size > config.max_file_size_bytes {
        return Err(ParseError::FileTooLarge {
            size,
            max: config.max_file_size_bytes,
        });
    }
    Ok(())
}

// =============================================================================
// Text decoding
// =============================================================================

/// Resolve an encoding label the way browsers do (`latin1` is windows-1252).
///
/// Unknown labels resolve to UTF-8.
fn encoding_for_label(label: &str) -> &'static Encoding {
    Encoding::for_label(label.trim().as_bytes()).unwrap_or(encoding_rs::UTF_8)
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always `utf-8`; chardet is only consulted for other bytes.
/// The returned name is the encoding [`decode_content`] will decode with.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    let encoding = match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => encoding_rs::WINDOWS_1252,
        label => encoding_for_label(label),
    };
    encoding.name().to_lowercase()
}

/// Decode bytes with the given encoding, stripping a UTF-8 BOM.
///
/// Unknown labels decode as lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let (decoded, _) = encoding_for_label(encoding).decode_without_bom_handling(bytes);

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded.into_owned(),
    }
}

/// Detect the delimiter by counting candidates in the first line.
///
/// Falls back to `default` when none of `, ; \t |` appears.
pub fn detect_delimiter(content: &str, default: char) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = default;
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// Headers
// =============================================================================

/// Trim headers, name blanks `__EMPTY` and suffix repeats with `_1`, `_2`...
pub fn dedupe_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut headers: Vec<String> = Vec::new();
    for header in raw {
        let trimmed = header.as_ref().trim();
        let base = if trimmed.is_empty() { "__EMPTY" } else { trimmed };

        let mut candidate = base.to_string();
        let mut n = 1;
        while headers.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        headers.push(candidate);
    }
    headers
}

/// Build a row from positional cells; missing trailing cells become `""`.
pub(crate) fn row_from_cells<I>(headers: &[String], cells: I) -> Row
where
    I: IntoIterator<Item = Value>,
{
    let mut cells = cells.into_iter();
    headers
        .iter()
        .map(|header| {
            let value = cells.next().unwrap_or_else(|| Value::String(String::new()));
            (header.clone(), value)
        })
        .collect()
}

// =============================================================================
// Delimited text
// =============================================================================

/// Parse delimited text with a header line.
///
/// Empty lines are skipped (whitespace-only lines are rows), short records
/// padded, extra fields ignored.
pub fn parse_delimited(content: &str, delimiter: char) -> ParseResult<(Vec<String>, Vec<Row>)> {
    if !delimiter.is_ascii() {
        return Err(ParseError::Csv {
            line: 1,
            message: format!("delimiter '{}' is not a single-byte character", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = dedupe_headers(reader.headers()?.iter());
    if headers.is_empty() || (headers.len() == 1 && headers[0] == "__EMPTY") {
        return Err(ParseError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(row_from_cells(
            &headers,
            record.iter().map(|field| Value::String(field.to_string())),
        ));
    }

    Ok((headers, rows))
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse file bytes of a known format and run column detection.
///
/// `sheet` is only used for workbooks; `None` reads the first sheet.
pub fn parse_bytes(
    bytes: &[u8],
    format: FileFormat,
    sheet: Option<&str>,
    config: &Config,
) -> ParseResult<ParsedData> {
    check_size(bytes.len() as u64, config)?;

    let (headers, rows, encoding, delimiter, sheet) = if format.is_workbook() {
        log_info(format!("Reading {} workbook...", format.extension().to_uppercase()));
        let (sheet_name, headers, rows) = parse_workbook(bytes, sheet)?;
        log_success(format!("Sheet: {}", sheet_name));
        (headers, rows, None, None, Some(sheet_name))
    } else {
        log_info("Detecting encoding and separator...");
        let encoding = detect_encoding(bytes);
        let content = decode_content(bytes, &encoding);
        let delimiter = match format {
            FileFormat::Tsv => '\t',
            _ => detect_delimiter(&content, config.default_delimiter),
        };
        log_success(format!("Detected encoding: {}", encoding));
        log_success(format!("Detected separator: '{}'", format_delimiter(delimiter)));
        let (headers, rows) = parse_delimited(&content, delimiter)?;
        (headers, rows, Some(encoding), Some(delimiter), None)
    };

    if rows.is_empty() {
        return Err(ParseError::NoDataRows);
    }
    log_success(format!("Read {} rows, {} columns", rows.len(), headers.len()));

    let detected_mapping = detect(&headers);

    Ok(ParsedData {
        total_rows: rows.len(),
        headers,
        rows,
        format,
        encoding,
        delimiter,
        sheet,
        detected_mapping,
    })
}

/// Read and parse a file.
///
/// File reading is async; parsing runs on the blocking pool.
pub async fn load_file(
    path: impl AsRef<Path>,
    sheet: Option<String>,
    config: &Config,
) -> ParseResult<ParsedData> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    let size = tokio::fs::metadata(path).await?.len();
    check_size(size, config)?;

    log_info(format!("📖 Reading {}...", path.display()));
    let bytes = tokio::fs::read(path).await?;
    let config = config.clone();

    tokio::task::spawn_blocking(move || parse_bytes(&bytes, format, sheet.as_deref(), &config))
        .await
        .map_err(|e| ParseError::Task(e.to_string()))?
}

/// List the sheets of a workbook file.
pub async fn load_sheet_list(
    path: impl AsRef<Path>,
    config: &Config,
) -> ParseResult<Vec<SheetInfo>> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    if !format.is_workbook() {
        return Err(ParseError::UnsupportedFileType(format!(
            ".{} (sheets exist only in .xlsx and .xls files)",
            format.extension()
        )));
    }
    let bytes = tokio::fs::read(path).await?;
    check_size(bytes.len() as u64, config)?;

    tokio::task::spawn_blocking(move || list_sheets(&bytes))
        .await
        .map_err(|e| ParseError::Task(e.to_string()))?
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
