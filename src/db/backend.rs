//! Connection traits the DAO layer is written against.
//!
//! `ConnectionProvider` is the single seam between statement assembly and a
//! live server: it hands out ready connections (target database selected).
//! The default provider opens a fresh connection per call; a pooling
//! provider can be swapped in without touching the DAO.

use super::query::Placeholder;
use super::record::Row;
use super::value::SqlValue;
use crate::error::Result;

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows of a row-returning statement, in server order.
    Rows(Vec<Row>),
    /// Affected-row count of a write statement.
    Affected(u64),
}

impl QueryOutcome {
    /// Affected-row count. For row-returning statements this is the number of
    /// rows returned (e.g. `INSERT ... RETURNING`).
    pub fn affected_rows(&self) -> u64 {
        match self {
            QueryOutcome::Rows(rows) => rows.len() as u64,
            QueryOutcome::Affected(n) => *n,
        }
    }

    /// Rows, or an empty list for write statements.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Affected(_) => Vec::new(),
        }
    }
}

/// A live connection with the target database selected.
pub trait Connection: Send {
    /// Backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Placeholder syntax statements for this connection must use.
    fn placeholder(&self) -> Placeholder;

    /// Prepare `sql`, bind `params` positionally and run it.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome>;

    /// Whether `name` is a table in the currently selected database, resolved
    /// the way the backend resolves the unquoted name in a statement (exact
    /// match, no patterns).
    fn table_exists(&mut self, name: &str) -> Result<bool>;

    /// Whether the connection is still alive.
    fn ping(&mut self) -> bool;

    /// Release the connection. Returns whether the close succeeded; closing
    /// twice returns false.
    fn close(&mut self) -> bool;

    /// Message of the most recent failed operation, empty if none.
    fn last_error(&self) -> &str;
}

/// Source of ready connections.
pub trait ConnectionProvider {
    /// Acquire a connection with the target database selected.
    fn acquire(&self) -> Result<Box<dyn Connection>>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        (**self).acquire()
    }
}
