//! Identifier validation and quoting for assembled SQL.
//!
//! Table and column names are spliced into statement text, so they are
//! checked against a conservative identifier grammar before any statement is
//! built. Values never go through here; they are always bound as parameters.

use crate::error::{DaoError, Result};

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Check that `name` is a plain identifier, optionally schema-qualified
/// (`schema.table`).
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(one), None, None) => is_plain_identifier(one),
        (Some(schema), Some(table), None) => is_plain_identifier(schema) && is_plain_identifier(table),
        _ => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(DaoError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Quote an identifier for statements that cannot take it as a parameter
/// (`CREATE DATABASE`). Embedded double quotes are doubled.
pub fn quote_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 2);
    result.push('"');
    for c in name.chars() {
        if c == '"' {
            result.push('"');
        }
        result.push(c);
    }
    result.push('"');
    result
}
