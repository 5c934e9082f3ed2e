//! Cell emptiness and text rendering.

use serde_json::Value;

/// String forms treated as empty, matched case-sensitively after trimming.
pub const EMPTY_VALUES: [&str; 10] = [
    "", "null", "NULL", "undefined", "N/A", "n/a", "NA", "na", "-", "#N/A",
];

/// Whether a cell counts as empty.
///
/// Absent and null cells are empty, as is any cell whose trimmed text is in
/// [`EMPTY_VALUES`]. `"0"` and `false` are values, not blanks.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(v) => EMPTY_VALUES.contains(&cell_text(v).trim()),
    }
}

/// Text form of a cell as it would appear in a delimited file.
///
/// Null renders as an empty string; whole floats drop their fraction so
/// spreadsheet numbers like `5551234.0` read as `5551234`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Text of an optional cell; absent renders as an empty string.
pub fn optional_cell_text(value: Option<&Value>) -> String {
    value.map(cell_text).unwrap_or_default()
}
