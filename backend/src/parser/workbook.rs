//! XLSX/XLS reading via calamine.
//!
//! The first row of the sheet is the header row. Empty cells become `""`,
//! whole floats become integers and fully empty rows are skipped.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Number, Value};
use std::io::Cursor;

use super::{dedupe_headers, row_from_cells};
use crate::error::{ParseError, ParseResult};
use crate::models::{Row, SheetInfo};

/// Sheets of a workbook in file order.
pub fn list_sheets(bytes: &[u8]) -> ParseResult<Vec<SheetInfo>> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    Ok(workbook
        .sheet_names()
        .into_iter()
        .enumerate()
        .map(|(index, name)| SheetInfo { name, index })
        .collect())
}

/// Read one sheet (the first when `sheet` is `None`).
///
/// Returns the sheet name, the headers and the data rows.
pub fn parse_workbook(
    bytes: &[u8],
    sheet: Option<&str>,
) -> ParseResult<(String, Vec<String>, Vec<Row>)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ParseError::SheetNotFound(wanted.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ParseError::Workbook("workbook has no sheets".to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut lines = range.rows();

    let header_cells = lines.next().ok_or(ParseError::NoHeaders)?;
    let headers = dedupe_headers(header_cells.iter().map(header_text));
    if headers.iter().all(|h| h.starts_with("__EMPTY")) {
        return Err(ParseError::NoHeaders);
    }

    let rows = lines
        .filter(|cells| !cells.iter().all(is_blank))
        .map(|cells| row_from_cells(&headers, cells.iter().map(cell_value)))
        .collect();

    Ok((sheet_name, headers, rows))
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => match cell_value(other) {
            Value::String(s) => s,
            value => value.to_string(),
        },
    }
}

/// Convert a calamine cell to a row value.
pub(crate) fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Value::from(*f as i64)
            } else {
                Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        other => Value::String(other.to_string()),
    }
}
