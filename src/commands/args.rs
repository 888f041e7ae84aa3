//! Parsers for command-line column assignments and conditions.
//!
//! - Assignments: `column=value`
//! - Conditions: `column<op>value` with `=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`,
//!   or `column like pattern` / `column not like pattern`
//!
//! Values go through `SqlValue::parse_literal`: `null`, `true`/`false`,
//! integers and floats are typed, anything else is text. Wrap a value in
//! single quotes to force text (`code='42'`).

use clap::Args;

use crate::db::{Condition, Operator, Record, SqlValue, validate_identifier};

const SYMBOL_OPERATORS: [&str; 8] = [">=", "<=", "!=", "<>", "==", "=", "<", ">"];

fn checked_column(column: &str) -> Result<String, String> {
    let column = column.trim();
    validate_identifier(column)
        .map(str::to_string)
        .map_err(|_| format!("invalid column name '{}'", column))
}

/// Parse `column=value`.
pub fn parse_assignment(input: &str) -> Result<(String, SqlValue), String> {
    let (column, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{}'", input))?;
    Ok((checked_column(column)?, SqlValue::parse_literal(value)))
}

/// Position and operator of the first `like` / `not like` keyword.
fn find_keyword(input: &str) -> Option<(usize, &'static str, Operator)> {
    let lowered = input.to_ascii_lowercase();
    [(" not like ", Operator::NotLike), (" like ", Operator::Like)]
        .into_iter()
        .filter_map(|(keyword, op)| lowered.find(keyword).map(|pos| (pos, keyword, op)))
        .min_by_key(|(pos, _, _)| *pos)
}

/// Parse a structured condition; the value is always bound as a parameter.
///
/// The operator is whichever comes first after the column, so the value may
/// itself contain `like` or comparison characters.
pub fn parse_condition(input: &str) -> Result<Condition, String> {
    let symbol_pos = input.find(['=', '<', '>', '!']);

    if let Some((pos, keyword, op)) = find_keyword(input) {
        if symbol_pos.is_none_or(|symbol_pos| pos < symbol_pos) {
            let column = checked_column(&input[..pos])?;
            let pattern = input[pos + keyword.len()..].trim();
            return Ok(Condition::compare(column, op, SqlValue::parse_literal(pattern)));
        }
    }

    let pos = symbol_pos.ok_or_else(|| format!("expected column<op>value, got '{}'", input))?;
    let column = checked_column(&input[..pos])?;
    let rest = &input[pos..];

    let symbol = SYMBOL_OPERATORS
        .iter()
        .find(|symbol| rest.starts_with(**symbol))
        .ok_or_else(|| format!("unknown operator in '{}'", input))?;
    let op = Operator::parse(symbol).ok_or_else(|| format!("unknown operator '{}'", symbol))?;
    let value = rest[symbol.len()..].trim();

    Ok(Condition::compare(column, op, SqlValue::parse_literal(value)))
}

/// Collect parsed assignments into a `Record`, keeping argument order.
pub fn to_record(assignments: &[(String, SqlValue)]) -> Record {
    assignments.iter().cloned().collect()
}

/// Structured conditions followed by raw fragments.
pub fn to_conditions(conditions: &[Condition], raw: &[String]) -> Vec<Condition> {
    conditions
        .iter()
        .cloned()
        .chain(raw.iter().map(|fragment| Condition::unsafe_raw(fragment.as_str())))
        .collect()
}

/// Row filter shared by select, update and delete. All conditions are
/// joined with AND.
#[derive(Args, Debug, Clone, Default)]
pub struct WhereArgs {
    /// Condition as column<op>value, e.g. "age>18" or "name like v%" (repeatable)
    #[arg(short = 'w', long = "where", value_name = "CONDITION", value_parser = parse_condition)]
    pub conditions: Vec<Condition>,

    /// SQL fragment inserted verbatim into the WHERE clause. Never pass untrusted input
    #[arg(long = "raw-where", value_name = "SQL")]
    pub raw: Vec<String>,
}

impl WhereArgs {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.raw.is_empty()
    }

    pub fn to_conditions(&self) -> Vec<Condition> {
        to_conditions(&self.conditions, &self.raw)
    }
}
