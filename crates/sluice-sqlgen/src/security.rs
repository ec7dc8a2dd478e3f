//! Injection guards for generated SQL.
//!
//! Generated statements are handed to the database client as plain text with
//! no parameter binding, so every interpolated piece passes through here:
//! - table and cursor column names are checked against a strict identifier
//!   grammar when a config is initialized
//! - cursor values are quoted as single-quoted literals with `'` doubled

use std::fmt;

use crate::error::{Error, Result};

/// Longest identifier accepted, the SQL Server and Oracle limit
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// What a checked identifier names in a query config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentRole {
    /// `table`
    Table,
    /// A cursor column (`indexField`)
    IndexField,
}

impl fmt::Display for IdentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::IndexField => f.write_str("index field"),
        }
    }
}

/// Why a name is not a plain identifier, if it is not one.
fn identifier_defect(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("is empty".to_string());
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Some(format!("is longer than {} bytes", MAX_IDENTIFIER_LEN));
    }
    name.char_indices()
        .find(|&(i, c)| {
            let allowed = if i == 0 {
                c.is_ascii_alphabetic()
            } else {
                c.is_ascii_alphanumeric()
            };
            !(allowed || c == '_')
        })
        .map(|(i, c)| format!("has {:?} at offset {}", c, i))
}

/// Check that `name` is a plain identifier: an ASCII letter or `_`, then
/// letters, digits and `_`.
///
/// ```
/// use sluice_sqlgen::security::{validate_identifier, IdentRole};
///
/// assert!(validate_identifier("responseTime", IdentRole::IndexField).is_ok());
/// assert!(validate_identifier("id; DROP TABLE users--", IdentRole::IndexField).is_err());
/// ```
pub fn validate_identifier(name: &str, role: IdentRole) -> Result<()> {
    match identifier_defect(name) {
        None => Ok(()),
        Some(defect) => Err(Error::config(format!("{} '{}' {}", role, name, defect))),
    }
}

/// Check a possibly schema-qualified table name (`schema.table`).
pub fn validate_table_name(name: &str) -> Result<()> {
    for part in name.split('.') {
        if let Some(defect) = identifier_defect(part) {
            return Err(Error::config(format!(
                "{} '{}': part '{}' {}",
                IdentRole::Table,
                name,
                part,
                defect
            )));
        }
    }
    Ok(())
}

/// Render a cursor value as a single-quoted SQL literal.
///
/// ```
/// use sluice_sqlgen::security::quote_literal;
///
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
