//! A loaded file plus the column mapping being edited for it.
//!
//! ```text
//! load_file ──▶ ParsedData ──▶ Session { detected, mapping }
//!                                 │
//!                                 ├── update_mapping / reset
//!                                 ├── statistics / preview_rows
//!                                 ├── clean_preview / clean ──▶ export_clean
//!                                 └── extract ──▶ export_extraction
//! ```
//!
//! The parsed rows never change. Only `mapping` moves; the core functions
//! in [`crate::transform`] are called with the current mapping each time.

use chrono::Local;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

use crate::config::Config;
use crate::detect::{detect_with_confidence, ColumnDetectionMap};
use crate::error::{SelectionError, SelectionResult, SessionResult};
use crate::export::{
    download_filename, extraction_extension, render_extraction, resolve_clean_format, write_table,
    CleanOutputFormat, ExportFormat,
};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::{CleanRule, ColumnMapping, ColumnType, Row};
use crate::parser::{load_file, ParsedData};
use crate::transform::{
    self, available_rules, compute_statistics, CleanOutcome, CleanPreview, CleanReport,
    DataStatistics, Extraction, OutputShape, RuleAvailability,
};

/// Rendered cleaned file and its totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanExport {
    pub filename: String,
    pub format: ExportFormat,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub report: CleanReport,
}

/// Rendered extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractExport {
    pub filename: String,
    pub content: String,
    pub record_count: usize,
}

/// JSON view of a session for `inspect --json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary<'a> {
    pub session_id: &'a str,
    pub format: crate::models::FileFormat,
    pub encoding: Option<&'a str>,
    pub delimiter: Option<String>,
    pub sheet: Option<&'a str>,
    pub headers: &'a [String],
    pub detection: &'a ColumnDetectionMap,
    pub mapping: &'a ColumnMapping,
    pub statistics: DataStatistics,
    pub rules: Vec<RuleAvailability>,
    pub preview: &'a [Row],
}

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: ParsedData,
    detected: ColumnDetectionMap,
    mapping: ColumnMapping,
    config: Config,
}

impl Session {
    /// Start a session on parsed data with the detected mapping.
    pub fn new(data: ParsedData, config: &Config) -> Self {
        let detected = detect_with_confidence(&data.headers);
        let mapping = data.detected_mapping.clone();

        let session = Session {
            id: Uuid::new_v4().to_string(),
            data,
            detected,
            mapping,
            config: config.clone(),
        };
        session.log_mapping();
        session
    }

    /// Load a file and start a session on it.
    pub async fn open(
        path: impl AsRef<Path>,
        sheet: Option<String>,
        config: &Config,
    ) -> SessionResult<Self> {
        let data = load_file(path, sheet, config).await?;
        Ok(Session::new(data, config))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &ParsedData {
        &self.data
    }

    pub fn headers(&self) -> &[String] {
        &self.data.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.data.rows
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn detection(&self) -> &ColumnDetectionMap {
        &self.detected
    }

    // =========================================================================
    // Mapping edits
    // =========================================================================

    /// Assign `header` to `column_type`, or unmap it with `None`.
    ///
    /// The header must exist and must not be held by another type.
    pub fn update_mapping(
        &mut self,
        column_type: ColumnType,
        header: Option<String>,
    ) -> SelectionResult<()> {
        let Some(header) = header else {
            self.mapping.set(column_type, None);
            return Ok(());
        };

        if !self.data.headers.contains(&header) {
            return Err(SelectionError::UnknownHeader(header));
        }
        match self.mapping.holder_of(&header) {
            Some(holder) if holder == column_type => return Ok(()),
            Some(holder) => {
                return Err(SelectionError::HeaderInUse {
                    header,
                    column_type: holder,
                })
            }
            None => {}
        }

        self.mapping.set(column_type, Some(header));
        Ok(())
    }

    /// Whether the current mapping for `column_type` is the detected one.
    pub fn is_auto_detected(&self, column_type: ColumnType) -> bool {
        match self.data.detected_mapping.get(column_type) {
            Some(detected) => self.mapping.get(column_type) == Some(detected),
            None => false,
        }
    }

    /// Headers `column_type` may be assigned: its own and any unclaimed one.
    pub fn available_headers(&self, column_type: ColumnType) -> Vec<&str> {
        self.data
            .headers
            .iter()
            .map(String::as_str)
            .filter(|header| match self.mapping.holder_of(header) {
                Some(holder) => holder == column_type,
                None => true,
            })
            .collect()
    }

    /// Restore the detected mapping.
    pub fn reset(&mut self) {
        self.mapping = self.data.detected_mapping.clone();
    }

    // =========================================================================
    // Core operations under the current mapping
    // =========================================================================

    pub fn statistics(&self) -> DataStatistics {
        compute_statistics(&self.data.headers, &self.data.rows, &self.mapping)
    }

    /// First rows, up to the configured preview size.
    pub fn preview_rows(&self) -> &[Row] {
        let end = self.config.max_preview_rows.min(self.data.rows.len());
        &self.data.rows[..end]
    }

    pub fn available_rules(&self) -> Vec<RuleAvailability> {
        available_rules(&self.mapping)
    }

    pub fn clean_preview(&self, rule: CleanRule) -> SelectionResult<CleanPreview> {
        transform::preview(&self.data.rows, &self.mapping, rule)
    }

    pub fn clean(&self, rule: CleanRule) -> SelectionResult<CleanOutcome> {
        transform::classify(&self.data.rows, &self.mapping, rule)
    }

    pub fn extract(
        &self,
        selected: &[ColumnType],
        shape: OutputShape,
    ) -> SelectionResult<Extraction> {
        transform::extract(&self.data.rows, &self.mapping, selected, shape)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Clean with `rule` and render the kept rows under the original headers.
    pub fn export_clean(
        &self,
        rule: CleanRule,
        format: CleanOutputFormat,
    ) -> SessionResult<CleanExport> {
        log_info(format!("🧹 Cleaning with rule {}...", rule));
        let outcome = self.clean(rule)?;
        let report = CleanReport::from(&outcome);
        log_success(format!(
            "Kept {} of {} rows ({} removed)",
            report.cleaned_row_count, report.original_row_count, report.removed_row_count
        ));

        let format = resolve_clean_format(format, self.data.format);
        let content = write_table(&self.data.headers, &outcome.kept, format)?;

        Ok(CleanExport {
            filename: download_filename("cleaned", format.extension(), Local::now()),
            format,
            content,
            report,
        })
    }

    /// Extract the selected columns and render them.
    pub fn export_extraction(
        &self,
        selected: &[ColumnType],
        shape: OutputShape,
    ) -> SessionResult<ExtractExport> {
        let extraction = self.extract(selected, shape)?;
        log_success(format!(
            "Extracted {} ({} records)",
            extraction.headers().join(", "),
            extraction.len()
        ));

        Ok(ExtractExport {
            filename: download_filename(
                &extraction.file_prefix(),
                extraction_extension(&extraction),
                Local::now(),
            ),
            content: render_extraction(&extraction)?,
            record_count: extraction.len(),
        })
    }

    pub fn summary(&self) -> SessionSummary<'_> {
        SessionSummary {
            session_id: &self.id,
            format: self.data.format,
            encoding: self.data.encoding.as_deref(),
            delimiter: self.data.delimiter.map(|d| d.to_string()),
            sheet: self.data.sheet.as_deref(),
            headers: &self.data.headers,
            detection: &self.detected,
            mapping: &self.mapping,
            statistics: self.statistics(),
            rules: self.available_rules(),
            preview: self.preview_rows(),
        }
    }

    fn log_mapping(&self) {
        log_info(format!("🔎 Detected {} column(s):", self.mapping.mapped_count()));
        for column_type in ColumnType::ALL {
            let result = self.detected.get(column_type);
            if let Some(header) = &result.column {
                let label = column_type.label();
                log_info_indent(format!("{} → {} ({:?})", label, header, result.confidence), 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileFormat;
    use crate::parser::parse_workbook;
    use serde_json::json;

    fn session() -> Session {
        let headers: Vec<String> = ["Full Name", "Email", "Phone", "Alt Phone", "Notes"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows: Vec<Row> = vec![
            json!({
                "Full Name": "Ann", "Email": "a@x.com", "Phone": "", "Alt Phone": "1", "Notes": ""
            }),
            json!({
                "Full Name": "Bob", "Email": "", "Phone": "555", "Alt Phone": "", "Notes": ""
            }),
            json!({
                "Full Name": "Cy", "Email": "N/A", "Phone": "-", "Alt Phone": "2", "Notes": "x"
            }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let data = ParsedData {
            detected_mapping: crate::detect::detect(&headers),
            total_rows: rows.len(),
            headers,
            rows,
            format: FileFormat::Xlsx,
            encoding: None,
            delimiter: None,
            sheet: Some("Sheet1".into()),
        };
        Session::new(data, &Config::default())
    }

    #[test]
    fn test_starts_with_detected_mapping() {
        let session = session();
        assert_eq!(session.mapping().email.as_deref(), Some("Email"));
        assert_eq!(session.mapping().phone.as_deref(), Some("Phone"));
        assert_eq!(session.mapping().name.as_deref(), Some("Full Name"));
        assert!(session.is_auto_detected(ColumnType::Email));
        assert!(!session.is_auto_detected(ColumnType::Domain));
        assert_eq!(session.id().len(), 36);
    }

    #[test]
    fn test_update_mapping() {
        let mut session = session();

        session.update_mapping(ColumnType::Phone, Some("Alt Phone".into())).unwrap();
        assert_eq!(session.mapping().phone.as_deref(), Some("Alt Phone"));
        assert!(!session.is_auto_detected(ColumnType::Phone));

        session.update_mapping(ColumnType::Email, None).unwrap();
        assert_eq!(session.mapping().email, None);

        session.reset();
        assert_eq!(session.mapping(), &session.data().detected_mapping);
    }

    #[test]
    fn test_update_mapping_rejects_conflicts() {
        let mut session = session();

        assert_eq!(
            session.update_mapping(ColumnType::Domain, Some("Fax".into())),
            Err(SelectionError::UnknownHeader("Fax".into()))
        );
        assert_eq!(
            session.update_mapping(ColumnType::Domain, Some("Email".into())),
            Err(SelectionError::HeaderInUse {
                header: "Email".into(),
                column_type: ColumnType::Email,
            })
        );
        // same header on its own type is a no-op
        assert!(session.update_mapping(ColumnType::Email, Some("Email".into())).is_ok());
        assert_eq!(session.mapping().email.as_deref(), Some("Email"));
    }

    #[test]
    fn test_available_headers() {
        let session = session();
        assert_eq!(
            session.available_headers(ColumnType::Domain),
            vec!["Alt Phone", "Notes"]
        );
        assert_eq!(
            session.available_headers(ColumnType::Email),
            vec!["Email", "Alt Phone", "Notes"]
        );
    }

    #[test]
    fn test_statistics_follow_mapping() {
        let mut session = session();
        let stats = session.statistics();
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.total_columns, 5);
        assert_eq!(stats.email_count, 1);
        assert_eq!(stats.phone_count, 1);

        session.update_mapping(ColumnType::Phone, Some("Alt Phone".into())).unwrap();
        assert_eq!(session.statistics().phone_count, 2);

        session.update_mapping(ColumnType::Phone, None).unwrap();
        assert_eq!(session.statistics().empty_phone_count, 3);
    }

    #[test]
    fn test_clean_and_preview() {
        let session = session();
        let preview = session.clean_preview(CleanRule::EitherRequired).unwrap();
        assert_eq!(preview.keep_count, 2);
        assert_eq!(preview.remove_count, 1);

        let outcome = session.clean(CleanRule::BothRequired).unwrap();
        assert_eq!(outcome.kept_count(), 0);
    }

    #[test]
    fn test_clean_unavailable_after_unmap() {
        let mut session = session();
        session.update_mapping(ColumnType::Phone, None).unwrap();

        assert!(matches!(
            session.clean(CleanRule::PhoneRequired),
            Err(SelectionError::RuleUnavailable { .. })
        ));
        let available: Vec<bool> = session.available_rules().iter().map(|r| r.available).collect();
        assert_eq!(available, vec![true, false, false, true]);
    }

    #[test]
    fn test_export_clean_workbook_stays_workbook() {
        let session = session();
        let export = session
            .export_clean(CleanRule::EitherRequired, CleanOutputFormat::Original)
            .unwrap();

        assert_eq!(export.format, ExportFormat::Xlsx);
        assert!(export.filename.starts_with("cleaned_"));
        assert!(export.filename.ends_with(".xlsx"));
        assert_eq!(export.report.cleaned_row_count, 2);

        let (sheet, headers, rows) = parse_workbook(&export.content, None).unwrap();
        assert_eq!(sheet, "Sheet1");
        assert_eq!(headers, session.headers());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Email"], "a@x.com");
        assert_eq!(rows[1]["Full Name"], "Bob");
        assert_eq!(rows[1]["Phone"], "555");
    }

    #[test]
    fn test_export_clean_as_csv() {
        let session = session();
        let export = session
            .export_clean(CleanRule::EmailRequired, CleanOutputFormat::Csv)
            .unwrap();

        assert_eq!(export.format, ExportFormat::Csv);
        assert!(export.filename.ends_with(".csv"));
        assert_eq!(export.report.cleaned_row_count, 1);
        let content = String::from_utf8(export.content).unwrap();
        assert_eq!(
            content.trim_start_matches('\u{feff}'),
            "Full Name,Email,Phone,Alt Phone,Notes\nAnn,a@x.com,,1,\n"
        );
    }

    #[test]
    fn test_export_extraction() {
        let session = session();

        let export = session.export_extraction(&[ColumnType::Name], OutputShape::Lines).unwrap();
        assert!(export.filename.starts_with("extract_name_"));
        assert!(export.filename.ends_with(".txt"));
        assert_eq!(export.content, "Ann\nBob\nCy");
        assert_eq!(export.record_count, 3);

        let err = session.export_extraction(&[ColumnType::Domain], OutputShape::Table);
        assert!(err.is_err());
    }

    #[test]
    fn test_preview_rows_capped() {
        let mut session = session();
        session.config.max_preview_rows = 2;
        assert_eq!(session.preview_rows().len(), 2);
    }

    #[test]
    fn test_summary_serializes() {
        let session = session();
        let json = serde_json::to_value(session.summary()).unwrap();
        assert_eq!(json["format"], "xlsx");
        assert_eq!(json["sheet"], "Sheet1");
        assert_eq!(json["detection"]["email"]["confidence"], "high");
        assert_eq!(json["statistics"]["totalRows"], 3);
        assert_eq!(json["rules"].as_array().unwrap().len(), 4);
    }
}
