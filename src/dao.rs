//! Record-level CRUD operations.
//!
//! Each operation acquires its own connection from the provider, checks the
//! target table exists, builds a parameterized statement and runs it. The
//! connection is held in a `ScopedConnection`, so it is closed on every exit
//! path before any error reaches the caller.

use crate::db::{
    build_delete, build_insert, build_select, build_update, validate_identifier, Condition,
    ConnectionProvider, QueryOutcome, Record, Row, ScopedConnection, SqlValue,
};
use crate::error::{DaoError, Result};

/// Statement-building data access object over a connection provider.
#[derive(Debug, Clone)]
pub struct RecordDao<P> {
    provider: P,
}

impl<P: ConnectionProvider> RecordDao<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Acquire a connection and fail with `TableNotFound` before anything
    /// else is sent if `table` is missing.
    fn open_table(&self, table: &str) -> Result<ScopedConnection> {
        let mut conn = ScopedConnection::acquire(&self.provider)?;
        if !conn.table_exists(table)? {
            return Err(DaoError::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(conn)
    }

    /// Insert one row. Returns the affected-row count (1 on success).
    pub fn insert(&self, table: &str, values: &Record) -> Result<u64> {
        check_input("insert", table, Some(values))?;
        let mut conn = self.open_table(table)?;
        let stmt = build_insert(table, values, conn.placeholder())?;
        let affected = conn.execute(&stmt.sql, &stmt.params)?.affected_rows();
        tracing::debug!(table, affected, "insert");
        Ok(affected)
    }

    /// `SELECT *` with all conditions joined by `AND`.
    pub fn select(&self, table: &str, conditions: &[Condition]) -> Result<Vec<Row>> {
        check_input("select", table, None)?;
        let mut conn = self.open_table(table)?;
        let stmt = build_select(table, conditions, conn.placeholder())?;
        let rows = conn.execute(&stmt.sql, &stmt.params)?.into_rows();
        tracing::debug!(table, rows = rows.len(), "select");
        Ok(rows)
    }

    /// Update matching rows. Returns the affected-row count.
    pub fn update(&self, table: &str, values: &Record, conditions: &[Condition]) -> Result<u64> {
        check_input("update", table, Some(values))?;
        let mut conn = self.open_table(table)?;
        let stmt = build_update(table, values, conditions, conn.placeholder())?;
        let affected = conn.execute(&stmt.sql, &stmt.params)?.affected_rows();
        tracing::debug!(table, affected, "update");
        Ok(affected)
    }

    /// Delete matching rows. Returns the affected-row count.
    pub fn delete(&self, table: &str, conditions: &[Condition]) -> Result<u64> {
        check_input("delete", table, None)?;
        let mut conn = self.open_table(table)?;
        let stmt = build_delete(table, conditions, conn.placeholder())?;
        let affected = conn.execute(&stmt.sql, &stmt.params)?.affected_rows();
        tracing::debug!(table, affected, "delete");
        Ok(affected)
    }

    /// Run raw SQL with positional parameters. No table check.
    ///
    /// `sql` must use the placeholder syntax of the underlying connection
    /// (`$1, $2, ...` for PostgreSQL).
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome> {
        let mut conn = ScopedConnection::acquire(&self.provider)?;
        conn.execute(sql, params)
    }
}

/// Validation that needs no connection: identifiers and empty value sets.
fn check_input(operation: &'static str, table: &str, values: Option<&Record>) -> Result<()> {
    validate_identifier(table)?;
    if let Some(values) = values {
        if values.is_empty() {
            return Err(DaoError::EmptyInput {
                operation,
                table: table.to_string(),
            });
        }
        for column in values.columns() {
            validate_identifier(column)?;
        }
    }
    Ok(())
}
