//! Column extraction: project rows onto selected column types.
//!
//! Output columns are named after the type (`email`, `phone`, ...), never
//! after the source header. Selected types that are not mapped are dropped;
//! if nothing is left the extraction fails.
//!
//! | shape   | selected | result                                         |
//! |---------|----------|------------------------------------------------|
//! | `table` | any      | rows keyed by type name                        |
//! | `lines` | one      | one value per row, blank values skipped        |
//! | `lines` | several  | tab-joined values per row, no rows skipped     |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::empty::optional_cell_text;
use crate::error::{SelectionError, SelectionResult};
use crate::models::{ColumnMapping, ColumnType, Row};

/// Requested output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Structured rows, for CSV export.
    #[default]
    Table,
    /// Plain text lines, for TXT export.
    Lines,
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputShape::Table => f.write_str("table"),
            OutputShape::Lines => f.write_str("lines"),
        }
    }
}

impl FromStr for OutputShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "csv" => Ok(OutputShape::Table),
            "lines" | "txt" => Ok(OutputShape::Lines),
            other => Err(format!("unknown output shape '{}' (expected table or lines)", other)),
        }
    }
}

/// Projected dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Rows keyed by type name.
    Table { columns: Vec<ColumnType>, rows: Vec<Row> },
    /// Non-blank values of a single column.
    List { column: ColumnType, values: Vec<String> },
    /// Tab-joined values per row; the header line is [`Extraction::header_line`].
    Delimited { columns: Vec<ColumnType>, lines: Vec<String> },
}

impl Extraction {
    /// Output column names.
    pub fn headers(&self) -> Vec<String> {
        match self {
            Extraction::Table { columns, .. } | Extraction::Delimited { columns, .. } => {
                columns.iter().map(|c| c.to_string()).collect()
            }
            Extraction::List { column, .. } => vec![column.to_string()],
        }
    }

    /// Tab-joined header line of the multi-column text form.
    pub fn header_line(&self) -> Option<String> {
        match self {
            Extraction::Delimited { .. } => Some(self.headers().join("\t")),
            _ => None,
        }
    }

    /// Number of emitted records (rows, values or data lines).
    pub fn len(&self) -> usize {
        match self {
            Extraction::Table { rows, .. } => rows.len(),
            Extraction::List { values, .. } => values.len(),
            Extraction::Delimited { lines, .. } => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line-oriented text, `None` for the table shape.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Extraction::Table { .. } => None,
            Extraction::List { values, .. } => Some(values.join("\n")),
            Extraction::Delimited { lines, .. } => {
                let header = self.header_line().unwrap_or_default();
                let mut out = Vec::with_capacity(lines.len() + 1);
                out.push(header.as_str());
                out.extend(lines.iter().map(String::as_str));
                Some(out.join("\n"))
            }
        }
    }

    /// File name prefix used when exporting this extraction.
    pub fn file_prefix(&self) -> String {
        match self {
            Extraction::List { column, .. } => format!("extract_{}", column),
            _ => "extract".to_string(),
        }
    }
}

/// Selected types that are mapped, paired with their header, in selection
/// order without duplicates.
pub fn resolve_columns<'m>(
    mapping: &'m ColumnMapping,
    selected: &[ColumnType],
) -> Vec<(ColumnType, &'m str)> {
    let mut resolved: Vec<(ColumnType, &'m str)> = Vec::new();
    for &column_type in selected {
        if resolved.iter().any(|(t, _)| *t == column_type) {
            continue;
        }
        if let Some(header) = mapping.get(column_type) {
            resolved.push((column_type, header));
        }
    }
    resolved
}

/// Project `rows` onto the selected column types.
pub fn extract(
    rows: &[Row],
    mapping: &ColumnMapping,
    selected: &[ColumnType],
    shape: OutputShape,
) -> SelectionResult<Extraction> {
    let entries = resolve_columns(mapping, selected);
    if entries.is_empty() {
        return Err(SelectionError::NoMappedColumns);
    }
    let columns: Vec<ColumnType> = entries.iter().map(|(t, _)| *t).collect();

    let extraction = match (shape, entries.as_slice()) {
        (OutputShape::Lines, [(column, header)]) => Extraction::List {
            column: *column,
            values: rows
                .iter()
                .map(|row| optional_cell_text(row.get(*header)))
                .filter(|v| !v.trim().is_empty())
                .collect(),
        },
        (OutputShape::Lines, _) => Extraction::Delimited {
            columns,
            lines: rows
                .iter()
                .map(|row| {
                    entries
                        .iter()
                        .map(|(_, header)| optional_cell_text(row.get(*header)))
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect(),
        },
        (OutputShape::Table, _) => Extraction::Table {
            columns,
            rows: rows
                .iter()
                .map(|row| {
                    entries
                        .iter()
                        .map(|(column_type, header)| {
                            let value = row.get(*header).cloned().unwrap_or(Value::Null);
                            (column_type.to_string(), value)
                        })
                        .collect::<Row>()
                })
                .collect(),
        },
    };

    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            json!({ "Mail": "a@x.com", "Tel": "555-0100", "Who": "Ann" }),
            json!({ "Mail": "  ", "Tel": 5550101, "Who": "Bob" }),
            json!({ "Tel": "555-0102", "Who": "Cy" }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            email: Some("Mail".into()),
            phone: Some("Tel".into()),
            name: Some("Who".into()),
            domain: None,
        }
    }

    #[test]
    fn test_table_renames_to_type_names() {
        let result = extract(
            &rows(),
            &mapping(),
            &[ColumnType::Name, ColumnType::Email],
            OutputShape::Table,
        )
        .unwrap();

        assert_eq!(result.headers(), vec!["name", "email"]);
        let Extraction::Table { rows, .. } = result else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["name"], "Ann");
        assert_eq!(rows[0]["email"], "a@x.com");
        assert_eq!(rows[2]["email"], Value::Null);
        for row in &rows {
            assert!(row.keys().all(|k| k == "name" || k == "email"));
        }
    }

    #[test]
    fn test_unmapped_selection_dropped() {
        let result = extract(
            &rows(),
            &mapping(),
            &[ColumnType::Domain, ColumnType::Phone],
            OutputShape::Table,
        )
        .unwrap();
        assert_eq!(result.headers(), vec!["phone"]);
    }

    #[test]
    fn test_nothing_mapped_fails() {
        let err = extract(&rows(), &mapping(), &[ColumnType::Domain], OutputShape::Lines);
        assert_eq!(err, Err(SelectionError::NoMappedColumns));

        let err = extract(&rows(), &mapping(), &[], OutputShape::Table);
        assert_eq!(err, Err(SelectionError::NoMappedColumns));
    }

    #[test]
    fn test_single_column_list_skips_blanks() {
        let result =
            extract(&rows(), &mapping(), &[ColumnType::Email], OutputShape::Lines).unwrap();

        assert_eq!(
            result,
            Extraction::List {
                column: ColumnType::Email,
                values: vec!["a@x.com".to_string()],
            }
        );
        assert_eq!(result.to_text().unwrap(), "a@x.com");
        assert_eq!(result.file_prefix(), "extract_email");
    }

    #[test]
    fn test_single_column_list_keeps_vocabulary_tokens() {
        let rows: Vec<Row> = vec![json!({ "Mail": "N/A" }).as_object().unwrap().clone()];
        let result = extract(&rows, &mapping(), &[ColumnType::Email], OutputShape::Lines).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_multi_column_lines_keep_every_row() {
        let result = extract(
            &rows(),
            &mapping(),
            &[ColumnType::Email, ColumnType::Phone],
            OutputShape::Lines,
        )
        .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.header_line().as_deref(), Some("email\tphone"));
        assert_eq!(
            result.to_text().unwrap(),
            "email\tphone\na@x.com\t555-0100\n  \t5550101\n\t555-0102"
        );
        assert_eq!(result.file_prefix(), "extract");
    }

    #[test]
    fn test_duplicate_selection_collapsed() {
        let result = extract(
            &rows(),
            &mapping(),
            &[ColumnType::Phone, ColumnType::Phone],
            OutputShape::Lines,
        )
        .unwrap();
        assert!(matches!(result, Extraction::List { column: ColumnType::Phone, .. }));
        assert_eq!(result.to_text().unwrap(), "555-0100\n5550101\n555-0102");
    }

    #[test]
    fn test_empty_rows() {
        let result = extract(&[], &mapping(), &[ColumnType::Email], OutputShape::Table).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_shape_parse() {
        assert_eq!("TXT".parse::<OutputShape>(), Ok(OutputShape::Lines));
        assert_eq!("table".parse::<OutputShape>(), Ok(OutputShape::Table));
        assert!("xml".parse::<OutputShape>().is_err());
    }
}
