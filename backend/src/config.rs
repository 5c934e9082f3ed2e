//! Runtime configuration.
//!
//! Defaults can be overridden from the environment (a `.env` file is loaded
//! first if present):
//!
//! | Variable                  | Default    |
//! |---------------------------|------------|
//! | `SHEETSIFT_MAX_FILE_SIZE` | `52428800` |
//! | `SHEETSIFT_PREVIEW_ROWS`  | `100`      |
//! | `SHEETSIFT_DELIMITER`     | `,`        |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::logs::log_warning;

/// Maximum accepted file size (50 MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Rows shown in a preview.
pub const MAX_PREVIEW_ROWS: usize = 100;

pub const ENV_MAX_FILE_SIZE: &str = "SHEETSIFT_MAX_FILE_SIZE";
pub const ENV_PREVIEW_ROWS: &str = "SHEETSIFT_PREVIEW_ROWS";
pub const ENV_DELIMITER: &str = "SHEETSIFT_DELIMITER";

/// Limits and defaults for ingestion and preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_file_size_bytes: u64,
    pub max_preview_rows: usize,
    /// Used when the first line of a CSV gives no delimiter hint.
    pub default_delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_preview_rows: MAX_PREVIEW_ROWS,
            default_delimiter: ',',
        }
    }
}

impl Config {
    /// Load `.env` (if any) and apply environment overrides.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_file_size_bytes: parse_or(&lookup, ENV_MAX_FILE_SIZE, defaults.max_file_size_bytes),
            max_preview_rows: parse_or(&lookup, ENV_PREVIEW_ROWS, defaults.max_preview_rows),
            default_delimiter: lookup(ENV_DELIMITER)
                .and_then(|v| parse_delimiter(&v))
                .unwrap_or(defaults.default_delimiter),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log_warning(format!("Ignoring invalid {}='{}'", key, raw));
            default
        }),
        None => default,
    }
}

/// Parse a delimiter, accepting `\t` and `tab` for the tab character.
pub fn parse_delimiter(raw: &str) -> Option<char> {
    match raw {
        "\\t" | "tab" | "TAB" | "\t" => Some('\t'),
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_file_size_bytes, 52_428_800);
        assert_eq!(config.max_preview_rows, 100);
        assert_eq!(config.default_delimiter, ',');
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_MAX_FILE_SIZE, "1024"),
            (ENV_PREVIEW_ROWS, "oops"),
            (ENV_DELIMITER, "tab"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.max_file_size_bytes, 1024);
        assert_eq!(config.max_preview_rows, 100);
        assert_eq!(config.default_delimiter, '\t');
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Some(';'));
        assert_eq!(parse_delimiter("\\t"), Some('\t'));
        assert_eq!(parse_delimiter(";;"), None);
        assert_eq!(parse_delimiter(""), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{ "max_preview_rows": 5 }"#).unwrap();
        assert_eq!(config.max_preview_rows, 5);
        assert_eq!(config.max_file_size_bytes, MAX_FILE_SIZE_BYTES);
    }
}
