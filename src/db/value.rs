//! Backend-agnostic values bound to statements and returned in rows.

use serde::{Serialize, Serializer};
use std::fmt;

/// A single column or parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Storage class a parameter is bound as.
///
/// Integers bind as integers, floats as floating-point, and everything else
/// (text, booleans, null) as text. The connector narrows the integer and
/// float kinds to the width the server expects for each placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    Integer,
    Float,
    Text,
}

impl SqlValue {
    pub fn bind_kind(&self) -> BindKind {
        match self {
            SqlValue::Int(_) => BindKind::Integer,
            SqlValue::Float(_) => BindKind::Float,
            _ => BindKind::Text,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(i) => Some(*i),
            SqlValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(i) => Some(*i as f64),
            SqlValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse a loosely typed command-line literal.
    ///
    /// `null`, `true`/`false`, integers and floats get their own variants;
    /// anything else is text. Single-quoted input is always text.
    pub fn parse_literal(input: &str) -> Self {
        if let Some(inner) = input.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            return SqlValue::Text(inner.to_string());
        }
        match input {
            "null" | "NULL" => SqlValue::Null,
            "true" => SqlValue::Bool(true),
            "false" => SqlValue::Bool(false),
            _ => {
                if let Ok(i) = input.parse::<i64>() {
                    SqlValue::Int(i)
                } else if let Ok(f) = input.parse::<f64>() {
                    if f.is_finite() {
                        SqlValue::Float(f)
                    } else {
                        SqlValue::Text(input.to_string())
                    }
                } else {
                    SqlValue::Text(input.to_string())
                }
            }
        }
    }

    /// Textual form used when binding a non-numeric value as text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Bool(b) => serializer.serialize_bool(*b),
            SqlValue::Int(i) => serializer.serialize_i64(*i),
            SqlValue::Float(f) => serializer.serialize_f64(*f),
            SqlValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
