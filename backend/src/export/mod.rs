//! Serialization of cleaned and extracted data.
//!
//! Delimited tables are written with the `csv` crate; CSV output starts with
//! a UTF-8 BOM so spreadsheet apps pick the right encoding. Workbooks are
//! written with `rust_xlsxwriter` as a single `Sheet1`. Line-shaped
//! extractions are plain text.

use chrono::{DateTime, Local};
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ExportError, ExportResult};
use crate::logs::log_info;
use crate::models::{FileFormat, Row};
use crate::transform::{cell_text, optional_cell_text, Extraction};

const UTF8_BOM: &str = "\u{feff}";

/// Name of the only sheet in exported workbooks.
pub const SHEET_NAME: &str = "Sheet1";

/// Tabular output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Requested output format for a cleaned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanOutputFormat {
    /// Same kind of file as the source.
    #[default]
    Original,
    Csv,
}

impl FromStr for CleanOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(CleanOutputFormat::Original),
            "csv" => Ok(CleanOutputFormat::Csv),
            other => Err(format!("unknown output format '{}' (expected original or csv)", other)),
        }
    }
}

/// Resolve the format a cleaned file is written in.
///
/// Delimited sources are written as CSV, workbooks as XLSX (`.xls` too).
pub fn resolve_clean_format(requested: CleanOutputFormat, source: FileFormat) -> ExportFormat {
    match (requested, source) {
        (CleanOutputFormat::Csv, _) => ExportFormat::Csv,
        (CleanOutputFormat::Original, FileFormat::Csv | FileFormat::Tsv) => ExportFormat::Csv,
        (CleanOutputFormat::Original, FileFormat::Xlsx) => ExportFormat::Xlsx,
        (CleanOutputFormat::Original, FileFormat::Xls) => {
            log_info("Legacy .xls source will be written as .xlsx");
            ExportFormat::Xlsx
        }
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Write `rows` under `headers` as delimited text, without a BOM.
///
/// Absent cells become empty fields.
pub fn write_delimited(headers: &[String], rows: &[Row], delimiter: u8) -> ExportResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| optional_cell_text(row.get(h))))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Write `rows` as a single-sheet workbook.
///
/// The first row holds the headers. Numbers and booleans keep their type;
/// absent, null and empty cells are left blank.
pub fn write_workbook(headers: &[String], rows: &[Row]) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, sheet_col(col)?, header.as_str())?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = sheet_row(index + 1)?;
        for (col, header) in headers.iter().enumerate() {
            let col = sheet_col(col)?;
            match row.get(header) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if s.is_empty() => {}
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(line, col, *b)?;
                }
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        worksheet.write_number(line, col, f)?;
                    }
                    None => {
                        worksheet.write_string(line, col, n.to_string().as_str())?;
                    }
                },
                Some(other) => {
                    worksheet.write_string(line, col, cell_text(other).as_str())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn sheet_row(index: usize) -> ExportResult<u32> {
    u32::try_from(index).map_err(|_| ExportError::SheetLimit("rows"))
}

fn sheet_col(index: usize) -> ExportResult<u16> {
    u16::try_from(index).map_err(|_| ExportError::SheetLimit("columns"))
}

/// Write `rows` under `headers` in `format`.
pub fn write_table(
    headers: &[String],
    rows: &[Row],
    format: ExportFormat,
) -> ExportResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => {
            let body = write_delimited(headers, rows, b',')?;
            Ok(format!("{}{}", UTF8_BOM, body).into_bytes())
        }
        ExportFormat::Tsv => Ok(write_delimited(headers, rows, b'\t')?.into_bytes()),
        ExportFormat::Xlsx => write_workbook(headers, rows),
    }
}

/// Render an extraction: tables as CSV, line shapes as text.
pub fn render_extraction(extraction: &Extraction) -> ExportResult<String> {
    match (extraction, extraction.to_text()) {
        (_, Some(text)) => Ok(text),
        (Extraction::Table { rows, .. }, None) => {
            let bytes = write_table(&extraction.headers(), rows, ExportFormat::Csv)?;
            Ok(String::from_utf8(bytes)?)
        }
        (_, None) => Ok(String::new()),
    }
}

/// File extension an extraction is saved with.
pub fn extraction_extension(extraction: &Extraction) -> &'static str {
    match extraction {
        Extraction::Table { .. } => "csv",
        _ => "txt",
    }
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn download_filename(prefix: &str, extension: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
}

/// Write rendered output to disk.
pub async fn write_output(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> ExportResult<()> {
    tokio::fs::write(path, content).await?;
    Ok(())
}
