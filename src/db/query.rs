//! Statement assembly for the CRUD operations.
//!
//! Builders take a table name, an ordered `Record` and a list of
//! `Condition`s and produce a `Statement`: SQL text plus one parameter per
//! placeholder, in left-to-right order. Values are always bound; only
//! identifiers (validated first) and explicitly unsafe raw fragments end up
//! in the SQL text.

use std::fmt;

use super::escape::validate_identifier;
use super::record::Record;
use super::value::SqlValue;
use crate::error::{DaoError, Result};

/// Placeholder syntax expected by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `?` for every parameter.
    #[default]
    Positional,
    /// `$1`, `$2`, ... (PostgreSQL).
    Numbered,
}

impl Placeholder {
    /// Render the placeholder for the 1-based parameter `index`.
    pub fn render(self, index: usize) -> String {
        match self {
            Placeholder::Positional => "?".to_string(),
            Placeholder::Numbered => format!("${}", index),
        }
    }
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Comparison operators for structured conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
        }
    }

    /// Parse the textual operator, e.g. from command-line input.
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Some(Operator::Eq),
            "!=" | "<>" => Some(Operator::Ne),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            "LIKE" => Some(Operator::Like),
            "NOT LIKE" => Some(Operator::NotLike),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single WHERE-clause term. Terms are joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> <bound value>`
    Compare {
        column: String,
        op: Operator,
        value: SqlValue,
    },
    IsNull { column: String },
    IsNotNull { column: String },
    /// Inserted into the WHERE clause verbatim. See [`Condition::unsafe_raw`].
    Raw(String),
}

impl Condition {
    pub fn compare(column: impl Into<String>, op: Operator, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Ne, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Le, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Ge, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(column, Operator::Like, SqlValue::Text(pattern.into()))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::IsNull {
            column: column.into(),
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Condition::IsNotNull {
            column: column.into(),
        }
    }

    /// A pre-formatted boolean expression inserted into the WHERE clause
    /// as-is.
    ///
    /// Nothing in the fragment is escaped or parameterized. Only pass text
    /// that contains no untrusted input; prefer the structured constructors.
    pub fn unsafe_raw(fragment: impl Into<String>) -> Self {
        Condition::Raw(fragment.into())
    }
}

/// Accumulates SQL text and parameters together so the placeholder count
/// always matches the parameter count.
struct StatementBuilder {
    sql: String,
    params: Vec<SqlValue>,
    style: Placeholder,
}

impl StatementBuilder {
    fn new(style: Placeholder) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            style,
        }
    }

    fn push_sql(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn push_param(&mut self, value: SqlValue) {
        self.params.push(value);
        let placeholder = self.style.render(self.params.len());
        self.sql.push_str(&placeholder);
    }

    fn push_where(&mut self, conditions: &[Condition]) -> Result<()> {
        if conditions.is_empty() {
            return Ok(());
        }

        self.push_sql(" WHERE ");
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.push_sql(" AND ");
            }
            match condition {
                Condition::Compare { column, op, value } => {
                    let column = validate_identifier(column)?;
                    match (op, value) {
                        (Operator::Eq, SqlValue::Null) => {
                            self.push_sql(column);
                            self.push_sql(" IS NULL");
                        }
                        (Operator::Ne, SqlValue::Null) => {
                            self.push_sql(column);
                            self.push_sql(" IS NOT NULL");
                        }
                        _ => {
                            self.push_sql(column);
                            self.push_sql(" ");
                            self.push_sql(op.as_sql());
                            self.push_sql(" ");
                            self.push_param(value.clone());
                        }
                    }
                }
                Condition::IsNull { column } => {
                    self.push_sql(validate_identifier(column)?);
                    self.push_sql(" IS NULL");
                }
                Condition::IsNotNull { column } => {
                    self.push_sql(validate_identifier(column)?);
                    self.push_sql(" IS NOT NULL");
                }
                Condition::Raw(fragment) => self.push_sql(fragment),
            }
        }
        Ok(())
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

fn validate_columns(record: &Record) -> Result<()> {
    for column in record.columns() {
        validate_identifier(column)?;
    }
    Ok(())
}

/// `INSERT INTO table (c1, c2) VALUES (?, ?)`
pub fn build_insert(table: &str, record: &Record, style: Placeholder) -> Result<Statement> {
    let table = validate_identifier(table)?;
    if record.is_empty() {
        return Err(DaoError::EmptyInput {
            operation: "insert",
            table: table.to_string(),
        });
    }
    validate_columns(record)?;

    let mut builder = StatementBuilder::new(style);
    builder.push_sql("INSERT INTO ");
    builder.push_sql(table);
    builder.push_sql(" (");
    builder.push_sql(&record.columns().collect::<Vec<_>>().join(", "));
    builder.push_sql(") VALUES (");
    for (i, value) in record.values().enumerate() {
        if i > 0 {
            builder.push_sql(", ");
        }
        builder.push_param(value.clone());
    }
    builder.push_sql(")");
    Ok(builder.finish())
}

/// `SELECT * FROM table [WHERE ...]`
pub fn build_select(table: &str, conditions: &[Condition], style: Placeholder) -> Result<Statement> {
    let table = validate_identifier(table)?;
    let mut builder = StatementBuilder::new(style);
    builder.push_sql("SELECT * FROM ");
    builder.push_sql(table);
    builder.push_where(conditions)?;
    Ok(builder.finish())
}

/// `UPDATE table SET c1 = ?, c2 = ? [WHERE ...]`
///
/// SET parameters come first, in column order, followed by any condition
/// parameters.
pub fn build_update(
    table: &str,
    record: &Record,
    conditions: &[Condition],
    style: Placeholder,
) -> Result<Statement> {
    let table = validate_identifier(table)?;
    if record.is_empty() {
        return Err(DaoError::EmptyInput {
            operation: "update",
            table: table.to_string(),
        });
    }
    validate_columns(record)?;

    let mut builder = StatementBuilder::new(style);
    builder.push_sql("UPDATE ");
    builder.push_sql(table);
    builder.push_sql(" SET ");
    for (i, (column, value)) in record.iter().enumerate() {
        if i > 0 {
            builder.push_sql(", ");
        }
        builder.push_sql(column);
        builder.push_sql(" = ");
        builder.push_param(value.clone());
    }
    builder.push_where(conditions)?;
    Ok(builder.finish())
}

/// `DELETE FROM table [WHERE ...]`
pub fn build_delete(table: &str, conditions: &[Condition], style: Placeholder) -> Result<Statement> {
    let table = validate_identifier(table)?;
    let mut builder = StatementBuilder::new(style);
    builder.push_sql("DELETE FROM ");
    builder.push_sql(table);
    builder.push_where(conditions)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn victor() -> Record {
        Record::new().with("name", "victor").with("age", 30)
    }

    #[rstest]
    fn test_insert_positional() {
        let stmt = build_insert("users", &victor(), Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO users (name, age) VALUES (?, ?)");
        assert_eq!(stmt.params, vec![SqlValue::Text("victor".into()), SqlValue::Int(30)]);
    }

    #[rstest]
    fn test_insert_numbered() {
        let stmt = build_insert("users", &victor(), Placeholder::Numbered).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO users (name, age) VALUES ($1, $2)");
    }

    #[rstest]
    fn test_insert_empty_record() {
        let err = build_insert("users", &Record::new(), Placeholder::Positional).unwrap_err();
        assert!(matches!(err, DaoError::EmptyInput { operation: "insert", .. }));
    }

    #[rstest]
    fn test_insert_rejects_bad_column() {
        let record = Record::new().with("name) VALUES ('x'); --", "y");
        let err = build_insert("users", &record, Placeholder::Positional).unwrap_err();
        assert!(matches!(err, DaoError::InvalidIdentifier { .. }));
    }

    #[rstest]
    fn test_select_without_conditions() {
        let stmt = build_select("users", &[], Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.params.is_empty());
    }

    #[rstest]
    fn test_select_raw_fragment() {
        let stmt = build_select("users", &[Condition::unsafe_raw("age > 18")], Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users WHERE age > 18");
        assert!(stmt.params.is_empty());
    }

    #[rstest]
    fn test_select_structured_conditions_are_bound() {
        let conditions = [Condition::gt("age", 18), Condition::eq("name", "o'brien")];
        let stmt = build_select("users", &conditions, Placeholder::Numbered).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users WHERE age > $1 AND name = $2");
        assert_eq!(stmt.params, vec![SqlValue::Int(18), SqlValue::Text("o'brien".into())]);
    }

    #[rstest]
    #[case(Condition::eq("deleted_at", SqlValue::Null), "SELECT * FROM users WHERE deleted_at IS NULL")]
    #[case(Condition::ne("deleted_at", SqlValue::Null), "SELECT * FROM users WHERE deleted_at IS NOT NULL")]
    #[case(Condition::is_null("email"), "SELECT * FROM users WHERE email IS NULL")]
    #[case(Condition::is_not_null("email"), "SELECT * FROM users WHERE email IS NOT NULL")]
    fn test_null_comparisons(#[case] condition: Condition, #[case] expected: &str) {
        let stmt = build_select("users", &[condition], Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql, expected);
        assert!(stmt.params.is_empty());
    }

    #[rstest]
    fn test_update_with_raw_condition() {
        let record = Record::new().with("age", 31);
        let stmt = build_update(
            "users",
            &record,
            &[Condition::unsafe_raw("name = 'victor'")],
            Placeholder::Positional,
        )
        .unwrap();
        assert_eq!(stmt.sql, "UPDATE users SET age = ? WHERE name = 'victor'");
        assert_eq!(stmt.params, vec![SqlValue::Int(31)]);
    }

    #[rstest]
    fn test_update_set_params_precede_condition_params() {
        let record = Record::new().with("age", 31).with("city", "Lyon");
        let stmt = build_update("users", &record, &[Condition::eq("name", "victor")], Placeholder::Numbered).unwrap();
        assert_eq!(stmt.sql, "UPDATE users SET age = $1, city = $2 WHERE name = $3");
        assert_eq!(
            stmt.params,
            vec![SqlValue::Int(31), SqlValue::Text("Lyon".into()), SqlValue::Text("victor".into())]
        );
    }

    #[rstest]
    fn test_update_empty_record() {
        let err = build_update("users", &Record::new(), &[], Placeholder::Positional).unwrap_err();
        assert!(matches!(err, DaoError::EmptyInput { operation: "update", .. }));
    }

    #[rstest]
    fn test_delete_with_multiple_conditions() {
        let conditions = [Condition::unsafe_raw("age < 18"), Condition::like("name", "v%")];
        let stmt = build_delete("users", &conditions, Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM users WHERE age < 18 AND name LIKE ?");
        assert_eq!(stmt.params, vec![SqlValue::Text("v%".into())]);
    }

    #[rstest]
    fn test_delete_rejects_bad_table() {
        let err = build_delete("users; DROP TABLE users", &[], Placeholder::Positional).unwrap_err();
        assert!(matches!(err, DaoError::InvalidIdentifier { .. }));
    }

    #[rstest]
    fn test_placeholder_count_matches_params() {
        let record = Record::new().with("a", 1).with("b", 2).with("c", 3);
        let stmt = build_update("t", &record, &[Condition::lt("d", 4)], Placeholder::Positional).unwrap();
        assert_eq!(stmt.sql.matches('?').count(), stmt.params.len());
    }

    #[rstest]
    #[case("=", Some(Operator::Eq))]
    #[case("<>", Some(Operator::Ne))]
    #[case("!=", Some(Operator::Ne))]
    #[case(">=", Some(Operator::Ge))]
    #[case("like", Some(Operator::Like))]
    #[case("not like", Some(Operator::NotLike))]
    #[case("~", None)]
    fn test_operator_parse(#[case] input: &str, #[case] expected: Option<Operator>) {
        assert_eq!(Operator::parse(input), expected);
    }
}
