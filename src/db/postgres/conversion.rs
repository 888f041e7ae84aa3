//! Type conversion utilities for the PostgreSQL backend.
//!
//! Handles conversion between:
//! - `SqlValue` parameters → PostgreSQL types (via `ToSql`)
//! - PostgreSQL result cells → `SqlValue` (via `FromSql`)
//!
//! Integer and float parameters are narrowed to the exact width the prepared
//! statement reports for each placeholder, since the driver refuses e.g. an
//! `i64` for an `int4` slot. Every other combination is sent in the text
//! format and parsed by the server, so `numeric`, `timestamp`, `uuid`, enums
//! and domains all take their usual literal syntax.
//!
//! Results always arrive in binary. Scalar types decode natively; `numeric`,
//! temporal types, `uuid` and `bytea` decode to their text form; anything
//! else decodes to the `\x`-prefixed hex of its binary value.

use std::error::Error;
use std::fmt::Write as _;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{Format, FromSql, IsNull, Kind, ToSql, Type};
use uuid::Uuid;

use crate::db::record::Record;
use crate::db::value::{BindKind, SqlValue};

type DecodeError = Box<dyn Error + Sync + Send>;

/// A boxed parameter ready to hand to the driver.
pub type BoxedParam = Box<dyn ToSql + Sync>;

/// SQL NULL, accepted for a parameter of any type.
#[derive(Debug)]
struct NullParam;

impl ToSql for NullParam {
    fn to_sql(&self, _ty: &Type, _out: &mut BytesMut) -> Result<IsNull, DecodeError> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, DecodeError> {
        self.to_sql(ty, out)
    }
}

/// A literal sent in the text format; the server parses it with the input
/// function of the parameter's type.
#[derive(Debug)]
struct TextParam(String);

impl ToSql for TextParam {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, DecodeError> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, DecodeError> {
        self.to_sql(ty, out)
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }
}

/// Raw binary cell, accepted for a column of any type.
struct RawCell<'a>(&'a [u8]);

impl<'a> FromSql<'a> for RawCell<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, DecodeError> {
        Ok(RawCell(raw))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn is_text_type(ty: &Type) -> bool {
    *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
        || ty.name() == "citext"
}

fn text_param(value: &SqlValue) -> BoxedParam {
    Box::new(TextParam(value.to_text().unwrap_or_default()))
}

fn bind_integer(value: i64, ty: &Type) -> Result<BoxedParam, String> {
    let out_of_range = || format!("integer {} out of range for parameter of type {}", value, ty.name());

    if *ty == Type::INT2 {
        Ok(Box::new(i16::try_from(value).map_err(|_| out_of_range())?))
    } else if *ty == Type::INT4 {
        Ok(Box::new(i32::try_from(value).map_err(|_| out_of_range())?))
    } else if *ty == Type::INT8 {
        Ok(Box::new(value))
    } else if *ty == Type::OID {
        Ok(Box::new(u32::try_from(value).map_err(|_| out_of_range())?))
    } else if *ty == Type::FLOAT4 {
        Ok(Box::new(value as f32))
    } else if *ty == Type::FLOAT8 {
        Ok(Box::new(value as f64))
    } else if is_text_type(ty) {
        Ok(Box::new(value.to_string()))
    } else {
        Ok(Box::new(TextParam(value.to_string())))
    }
}

fn bind_float(value: f64, ty: &Type) -> BoxedParam {
    if *ty == Type::FLOAT4 {
        Box::new(value as f32)
    } else if *ty == Type::FLOAT8 {
        Box::new(value)
    } else if is_text_type(ty) {
        Box::new(value.to_string())
    } else if value.is_infinite() {
        let literal = if value > 0.0 { "Infinity" } else { "-Infinity" };
        Box::new(TextParam(literal.to_string()))
    } else {
        Box::new(TextParam(value.to_string()))
    }
}

fn bind_text(value: &SqlValue, ty: &Type) -> BoxedParam {
    match value {
        SqlValue::Null => Box::new(NullParam),
        SqlValue::Bool(b) if *ty == Type::BOOL => Box::new(*b),
        other if is_text_type(ty) => Box::new(other.to_text().unwrap_or_default()),
        other => text_param(other),
    }
}

/// Convert one parameter for the placeholder of type `ty`.
pub fn to_sql_param(value: &SqlValue, ty: &Type) -> Result<BoxedParam, String> {
    match (value.bind_kind(), value) {
        (BindKind::Integer, SqlValue::Int(i)) => bind_integer(*i, ty),
        (BindKind::Float, SqlValue::Float(f)) => Ok(bind_float(*f, ty)),
        _ => Ok(bind_text(value, ty)),
    }
}

/// Convert all parameters positionally against the prepared statement's
/// parameter types. The caller has already checked the counts match.
pub fn bind_params(params: &[SqlValue], types: &[Type]) -> Result<Vec<BoxedParam>, String> {
    params
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (value, ty))| to_sql_param(value, ty).map_err(|e| format!("parameter {}: {}", i + 1, e)))
        .collect()
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Render a binary `numeric` exactly, honoring its display scale.
///
/// Layout: ndigits, weight, sign, dscale (all 16-bit), then ndigits base-10000
/// digits. `weight` is the power of 10000 of the first digit.
fn decode_numeric(raw: &[u8]) -> Result<String, DecodeError> {
    let word = |i: usize| -> Result<u16, DecodeError> {
        raw.get(i * 2..i * 2 + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = word(0)? as usize;
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    let dscale = word(3)? as usize;
    let digits = (0..ndigits).map(|i| word(4 + i)).collect::<Result<Vec<_>, _>>()?;

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign {:#06x}", other).into()),
    }

    let digit = |i: i32| -> u16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        for i in 0..=weight {
            if i == 0 {
                write!(out, "{}", digit(i))?;
            } else {
                write!(out, "{:04}", digit(i))?;
            }
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", digit(i))?;
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }
    Ok(out)
}

/// `infinity`/`-infinity` sentinels shared by the temporal types.
fn infinity_label(raw: &[u8], max: &[u8], min: &[u8]) -> Option<&'static str> {
    if raw == max {
        Some("infinity")
    } else if raw == min {
        Some("-infinity")
    } else {
        None
    }
}

fn hex_text(raw: &[u8]) -> String {
    format!("\\x{}", hex::encode(raw))
}

fn decode_raw(ty: &Type, raw: &[u8]) -> Result<SqlValue, DecodeError> {
    if let Kind::Domain(base) = ty.kind() {
        return decode_raw(base, raw);
    }

    let value = if *ty == Type::BOOL {
        SqlValue::Bool(bool::from_sql(ty, raw)?)
    } else if *ty == Type::INT2 {
        SqlValue::Int(i16::from_sql(ty, raw)?.into())
    } else if *ty == Type::INT4 {
        SqlValue::Int(i32::from_sql(ty, raw)?.into())
    } else if *ty == Type::INT8 {
        SqlValue::Int(i64::from_sql(ty, raw)?)
    } else if *ty == Type::OID {
        SqlValue::Int(u32::from_sql(ty, raw)?.into())
    } else if *ty == Type::FLOAT4 {
        SqlValue::Float(f32::from_sql(ty, raw)?.into())
    } else if *ty == Type::FLOAT8 {
        SqlValue::Float(f64::from_sql(ty, raw)?)
    } else if *ty == Type::NUMERIC {
        SqlValue::Text(decode_numeric(raw)?)
    } else if *ty == Type::TIMESTAMP || *ty == Type::TIMESTAMPTZ {
        let max = i64::MAX.to_be_bytes();
        let min = i64::MIN.to_be_bytes();
        match infinity_label(raw, &max, &min) {
            Some(label) => SqlValue::Text(label.to_string()),
            None if *ty == Type::TIMESTAMP => SqlValue::Text(NaiveDateTime::from_sql(ty, raw)?.to_string()),
            None => SqlValue::Text(
                DateTime::<Utc>::from_sql(ty, raw)?
                    .format("%Y-%m-%d %H:%M:%S%.f%:z")
                    .to_string(),
            ),
        }
    } else if *ty == Type::DATE {
        match infinity_label(raw, &i32::MAX.to_be_bytes(), &i32::MIN.to_be_bytes()) {
            Some(label) => SqlValue::Text(label.to_string()),
            None => SqlValue::Text(NaiveDate::from_sql(ty, raw)?.to_string()),
        }
    } else if *ty == Type::TIME {
        SqlValue::Text(NaiveTime::from_sql(ty, raw)?.to_string())
    } else if *ty == Type::UUID {
        SqlValue::Text(Uuid::from_sql(ty, raw)?.to_string())
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        SqlValue::Text(serde_json::Value::from_sql(ty, raw)?.to_string())
    } else if is_text_type(ty) || matches!(ty.kind(), Kind::Enum(_)) {
        SqlValue::Text(std::str::from_utf8(raw)?.to_string())
    } else {
        // bytea and types without a decoder; cast in SQL for another text form
        SqlValue::Text(hex_text(raw))
    };
    Ok(value)
}

fn decode_cell(row: &postgres::Row, idx: usize, ty: &Type) -> Result<SqlValue, String> {
    let cell = row
        .try_get::<_, Option<RawCell>>(idx)
        .map_err(|e| e.to_string())?;
    match cell {
        None => Ok(SqlValue::Null),
        Some(RawCell(raw)) => decode_raw(ty, raw).map_err(|e| format!("cannot decode {}: {}", ty.name(), e)),
    }
}

/// Convert a result row into a `Record`, keeping server column order.
pub fn row_to_record(row: &postgres::Row) -> Result<Record, String> {
    let mut record = Record::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_cell(row, idx, column.type_())
            .map_err(|e| format!("column '{}': {}", column.name(), e))?;
        record.push(column.name().to_string(), value);
    }
    Ok(record)
}
