//! Header patterns per column type.
//!
//! Patterns are compared against headers normalized with [`normalize`]
//! (trimmed, lowercased).

use crate::models::ColumnType;

/// Header matching rules for one [`ColumnType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionPattern {
    /// Full normalized header strings.
    pub exact: &'static [&'static str],
    /// Substrings of the normalized header.
    pub partial: &'static [&'static str],
    /// Substrings that veto a match from either list.
    pub exclude: &'static [&'static str],
}

pub const EMAIL: DetectionPattern = DetectionPattern {
    exact: &[
        "email",
        "e-mail",
        "mail",
        "email_address",
        "emailaddress",
        "e_mail",
        "correo",
    ],
    partial: &["email", "e-mail", "e_mail"],
    exclude: &[],
};

pub const PHONE: DetectionPattern = DetectionPattern {
    exact: &[
        "phone",
        "telephone",
        "mobile",
        "cell",
        "tel",
        "phone_number",
        "phonenumber",
        "contact_number",
        "fax",
        "mobile_number",
        "cell_phone",
    ],
    partial: &["phone", "mobile", "cell", "telefon"],
    exclude: &[],
};

pub const NAME: DetectionPattern = DetectionPattern {
    exact: &[
        "name",
        "full_name",
        "fullname",
        "full name",
        "contact_name",
        "person",
        "contact",
        "first_name",
        "last_name",
        "firstname",
        "lastname",
    ],
    partial: &["name"],
    // "name" alone would otherwise claim these
    exclude: &[
        "filename",
        "username",
        "file_name",
        "user_name",
        "domain_name",
        "hostname",
    ],
};

pub const DOMAIN: DetectionPattern = DetectionPattern {
    exact: &[
        "domain",
        "website",
        "url",
        "web",
        "site",
        "company_domain",
        "company_website",
        "homepage",
        "webpage",
    ],
    partial: &["domain", "website", "webpage"],
    exclude: &[],
};

impl DetectionPattern {
    pub const fn for_type(column_type: ColumnType) -> &'static DetectionPattern {
        match column_type {
            ColumnType::Email => &EMAIL,
            ColumnType::Phone => &PHONE,
            ColumnType::Name => &NAME,
            ColumnType::Domain => &DOMAIN,
        }
    }

    pub fn is_excluded(&self, normalized: &str) -> bool {
        self.exclude.iter().any(|ex| normalized.contains(ex))
    }

    pub fn matches_exact(&self, normalized: &str) -> bool {
        self.exact.contains(&normalized)
    }

    pub fn matches_partial(&self, normalized: &str) -> bool {
        self.partial.iter().any(|p| normalized.contains(p))
    }
}

/// Comparison form of a header. Only used for matching; mappings keep the
/// original header.
pub fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}
