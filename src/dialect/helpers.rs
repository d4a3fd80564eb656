//! Shared helper functions and tables for dialect profiles.
//!
//! Profiles are pure data; these are the reusable building blocks they
//! reference so the per-target files stay small.

/// Quote an identifier with arbitrary open/close characters, doubling any
/// embedded close character. Targets with empty quotes (Python) pass the
/// identifier through unchanged.
pub fn quote_with(ident: &str, open: &str, close: &str) -> String {
    if open.is_empty() && close.is_empty() {
        return ident.to_string();
    }
    let escaped = ident.replace(close, &close.repeat(2));
    format!("{open}{escaped}{close}")
}

/// Quote a string literal, doubling the embedded quote character.
pub fn quote_string_with(s: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    let escaped = s.replace(quote, &doubled);
    format!("{quote}{escaped}{quote}")
}

// =============================================================================
// Cast tables
// =============================================================================

/// Logical cast names for T-SQL.
pub const CASTS_TSQL: &[(&str, &str)] = &[
    ("int", "INT"),
    ("integer", "INT"),
    ("string", "VARCHAR(MAX)"),
    ("boolean", "BIT"),
    ("datetime", "DATETIME2"),
];

/// Logical cast names for ANSI-style targets.
pub const CASTS_ANSI: &[(&str, &str)] = &[
    ("int", "INT"),
    ("integer", "INT"),
    ("string", "TEXT"),
    ("boolean", "BOOLEAN"),
    ("datetime", "TIMESTAMP"),
];
