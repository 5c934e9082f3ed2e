//! Column type detection from headers.
//!
//! Infers at most one header per [`ColumnType`] by looking only at header
//! text, never at cell values.
//!
//! ```text
//!             exact pass                    partial pass
//! headers ──▶ email → phone → name → domain ──▶ (unmapped types only) ──▶ mapping
//!             first unclaimed exact match       first unclaimed substring match
//! ```
//!
//! Headers are claimed greedily: once a header is assigned it is skipped for
//! every later type and pass. Header order therefore decides ties, and an
//! exact match always beats a partial one because the exact pass runs first.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetsift::detect;
//!
//! let mapping = detect(&["Full Name", "Email Address", "Mobile", "Notes"]);
//! assert_eq!(mapping.name.as_deref(), Some("Full Name"));
//! assert_eq!(mapping.email.as_deref(), Some("Email Address"));
//! assert_eq!(mapping.phone.as_deref(), Some("Mobile"));
//! assert_eq!(mapping.domain, None);
//! ```

pub mod patterns;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{ColumnMapping, ColumnType};
pub use patterns::{normalize, DetectionPattern};

// =============================================================================
// Detection results
// =============================================================================

/// How a type's column was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Exact header match.
    High,
    /// Substring match.
    Medium,
    /// Not detected.
    #[default]
    None,
}

/// Detected column for one type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub column: Option<String>,
    pub confidence: Confidence,
}

/// Per-type detection results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnDetectionMap {
    pub email: DetectionResult,
    pub phone: DetectionResult,
    pub name: DetectionResult,
    pub domain: DetectionResult,
}

impl ColumnDetectionMap {
    pub fn get(&self, column_type: ColumnType) -> &DetectionResult {
        match column_type {
            ColumnType::Email => &self.email,
            ColumnType::Phone => &self.phone,
            ColumnType::Name => &self.name,
            ColumnType::Domain => &self.domain,
        }
    }

    fn get_mut(&mut self, column_type: ColumnType) -> &mut DetectionResult {
        match column_type {
            ColumnType::Email => &mut self.email,
            ColumnType::Phone => &mut self.phone,
            ColumnType::Name => &mut self.name,
            ColumnType::Domain => &mut self.domain,
        }
    }

    /// Plain mapping without confidence.
    pub fn mapping(&self) -> ColumnMapping {
        ColumnMapping {
            email: self.email.column.clone(),
            phone: self.phone.column.clone(),
            name: self.name.column.clone(),
            domain: self.domain.column.clone(),
        }
    }
}

// =============================================================================
// Detection
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum MatchPass {
    Exact,
    Partial,
}

impl MatchPass {
    fn accepts(self, pattern: &DetectionPattern, normalized: &str) -> bool {
        if pattern.is_excluded(normalized) {
            return false;
        }
        match self {
            MatchPass::Exact => pattern.matches_exact(normalized),
            MatchPass::Partial => pattern.matches_partial(normalized),
        }
    }

    fn confidence(self) -> Confidence {
        match self {
            MatchPass::Exact => Confidence::High,
            MatchPass::Partial => Confidence::Medium,
        }
    }
}

/// Accumulator threaded through the detection passes.
#[derive(Default)]
struct Claims {
    results: ColumnDetectionMap,
    /// Indices of headers already assigned to a type.
    used: HashSet<usize>,
}

impl Claims {
    fn claim(
        mut self,
        column_type: ColumnType,
        index: usize,
        header: &str,
        pass: MatchPass,
    ) -> Self {
        self.used.insert(index);
        *self.results.get_mut(column_type) = DetectionResult {
            column: Some(header.to_string()),
            confidence: pass.confidence(),
        };
        self
    }

    fn is_mapped(&self, column_type: ColumnType) -> bool {
        self.results.get(column_type).column.is_some()
    }
}

/// Detect columns, keeping how each was found.
pub fn detect_with_confidence<S: AsRef<str>>(headers: &[S]) -> ColumnDetectionMap {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h.as_ref())).collect();

    let claims = [MatchPass::Exact, MatchPass::Partial]
        .into_iter()
        .fold(Claims::default(), |claims, pass| {
            ColumnType::ALL.into_iter().fold(claims, |claims, column_type| {
                if claims.is_mapped(column_type) {
                    return claims;
                }
                let pattern = DetectionPattern::for_type(column_type);
                let found = normalized
                    .iter()
                    .enumerate()
                    .find(|(i, norm)| !claims.used.contains(i) && pass.accepts(pattern, norm))
                    .map(|(i, _)| i);

                match found {
                    Some(i) => claims.claim(column_type, i, headers[i].as_ref(), pass),
                    None => claims,
                }
            })
        });

    claims.results
}

/// Detect the default column mapping for a set of headers.
///
/// Deterministic for a given header order; an empty header list yields an
/// all-unmapped mapping.
pub fn detect<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    detect_with_confidence(headers).mapping()
}
