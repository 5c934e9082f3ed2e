//! Domain models shared by detection, cleaning and extraction.
//!
//! - [`ColumnType`] - Semantic column roles (email, phone, name, domain)
//! - [`ColumnMapping`] - Role → header assignment
//! - [`CleanRule`] - Row retention policies
//! - [`Row`] - One record keyed by header
//! - [`FileFormat`] / [`SheetInfo`] - Source file metadata

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A single record: header → cell value.
///
/// Cells are strings, numbers, booleans or null. A header missing from the
/// map is an absent cell.
pub type Row = Map<String, Value>;

// =============================================================================
// Column Type
// =============================================================================

/// Semantic role a column can be detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Email,
    Phone,
    Name,
    Domain,
}

impl ColumnType {
    /// All types in detection priority order.
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Email,
        ColumnType::Phone,
        ColumnType::Name,
        ColumnType::Domain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Email => "email",
            ColumnType::Phone => "phone",
            ColumnType::Name => "name",
            ColumnType::Domain => "domain",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Email => "Email",
            ColumnType::Phone => "Phone",
            ColumnType::Name => "Name",
            ColumnType::Domain => "Domain",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(ColumnType::Email),
            "phone" => Ok(ColumnType::Phone),
            "name" => Ok(ColumnType::Name),
            "domain" => Ok(ColumnType::Domain),
            other => Err(format!(
                "unknown column type '{}' (expected email, phone, name or domain)",
                other
            )),
        }
    }
}

// =============================================================================
// Column Mapping
// =============================================================================

/// Assignment of each [`ColumnType`] to a header, or unmapped.
///
/// A header is held by at most one type. [`crate::detect::detect`] builds
/// mappings that respect this, and [`crate::session::Session::update_mapping`]
/// enforces it for manual edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub domain: Option<String>,
}

impl ColumnMapping {
    /// Mapping with every type unmapped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Header mapped to `column_type`, if any.
    pub fn get(&self, column_type: ColumnType) -> Option<&str> {
        match column_type {
            ColumnType::Email => self.email.as_deref(),
            ColumnType::Phone => self.phone.as_deref(),
            ColumnType::Name => self.name.as_deref(),
            ColumnType::Domain => self.domain.as_deref(),
        }
    }

    /// Overwrite the slot for `column_type` without any uniqueness check.
    pub(crate) fn set(&mut self, column_type: ColumnType, header: Option<String>) {
        let slot = match column_type {
            ColumnType::Email => &mut self.email,
            ColumnType::Phone => &mut self.phone,
            ColumnType::Name => &mut self.name,
            ColumnType::Domain => &mut self.domain,
        };
        *slot = header;
    }

    pub fn is_mapped(&self, column_type: ColumnType) -> bool {
        self.get(column_type).is_some()
    }

    /// Mapped (type, header) pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnType, &str)> + '_ {
        ColumnType::ALL
            .into_iter()
            .filter_map(move |t| self.get(t).map(|h| (t, h)))
    }

    /// Type currently holding `header`.
    pub fn holder_of(&self, header: &str) -> Option<ColumnType> {
        self.iter().find(|(_, h)| *h == header).map(|(t, _)| t)
    }

    pub fn mapped_count(&self) -> usize {
        self.iter().count()
    }
}

// =============================================================================
// Clean Rule
// =============================================================================

/// Row retention policy based on emptiness of the email and phone columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanRule {
    /// Keep rows with a non-empty email.
    EmailRequired,
    /// Keep rows with a non-empty phone.
    PhoneRequired,
    /// Keep rows where both email and phone are non-empty.
    BothRequired,
    /// Keep rows where at least one of email/phone is non-empty.
    EitherRequired,
}

impl CleanRule {
    pub const ALL: [CleanRule; 4] = [
        CleanRule::EmailRequired,
        CleanRule::PhoneRequired,
        CleanRule::BothRequired,
        CleanRule::EitherRequired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CleanRule::EmailRequired => "email_required",
            CleanRule::PhoneRequired => "phone_required",
            CleanRule::BothRequired => "both_required",
            CleanRule::EitherRequired => "either_required",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CleanRule::EmailRequired => "Require Email",
            CleanRule::PhoneRequired => "Require Phone",
            CleanRule::BothRequired => "Require Both",
            CleanRule::EitherRequired => "Require Either",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CleanRule::EmailRequired => "Remove rows with empty email",
            CleanRule::PhoneRequired => "Remove rows with empty phone",
            CleanRule::BothRequired => "Remove rows where email OR phone is empty",
            CleanRule::EitherRequired => "Remove rows where BOTH email AND phone are empty",
        }
    }
}

impl fmt::Display for CleanRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "email_required" | "email" => Ok(CleanRule::EmailRequired),
            "phone_required" | "phone" => Ok(CleanRule::PhoneRequired),
            "both_required" | "both" => Ok(CleanRule::BothRequired),
            "either_required" | "either" => Ok(CleanRule::EitherRequired),
            other => Err(format!(
                "unknown clean rule '{}' (expected email_required, phone_required, \
                 both_required or either_required)",
                other
            )),
        }
    }
}

// =============================================================================
// File metadata
// =============================================================================

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
}

impl FileFormat {
    pub const ALLOWED_EXTENSIONS: [&'static str; 4] = [".csv", ".xlsx", ".xls", ".tsv"];

    /// Format for a file extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Tsv => "tsv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        }
    }

    /// Workbook formats go through the spreadsheet reader, not the CSV parser.
    pub fn is_workbook(&self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A sheet inside a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_get_and_iter() {
        let mapping = ColumnMapping {
            email: Some("Email".into()),
            phone: None,
            name: Some("Full Name".into()),
            domain: None,
        };

        assert_eq!(mapping.get(ColumnType::Email), Some("Email"));
        assert!(!mapping.is_mapped(ColumnType::Phone));
        assert_eq!(mapping.mapped_count(), 2);

        let pairs: Vec<_> = mapping.iter().collect();
        assert_eq!(
            pairs,
            vec![(ColumnType::Email, "Email"), (ColumnType::Name, "Full Name")]
        );
        assert_eq!(mapping.holder_of("Full Name"), Some(ColumnType::Name));
        assert_eq!(mapping.holder_of("Notes"), None);
    }

    #[test]
    fn test_mapping_serializes_nulls() {
        let json = serde_json::to_value(ColumnMapping::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "email": null, "phone": null, "name": null, "domain": null })
        );
    }

    #[test]
    fn test_rule_parse_and_display() {
        assert_eq!("either_required".parse::<CleanRule>(), Ok(CleanRule::EitherRequired));
        assert_eq!("Both-Required".parse::<CleanRule>(), Ok(CleanRule::BothRequired));
        assert!("any".parse::<CleanRule>().is_err());
        assert_eq!(CleanRule::PhoneRequired.to_string(), "phone_required");
        assert_eq!(
            serde_json::to_value(CleanRule::EmailRequired).unwrap(),
            "email_required"
        );
    }

    #[test]
    fn test_column_type_parse() {
        assert_eq!("Email".parse::<ColumnType>(), Ok(ColumnType::Email));
        assert_eq!(" domain ".parse::<ColumnType>(), Ok(ColumnType::Domain));
        assert!("fax".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(FileFormat::from_extension(".XLSX"), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_extension("tsv"), Some(FileFormat::Tsv));
        assert_eq!(FileFormat::from_extension("txt"), None);
        assert!(FileFormat::Xls.is_workbook());
        assert!(!FileFormat::Csv.is_workbook());
    }
}
