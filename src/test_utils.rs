//! Shared test utilities for DAO and client tests.
//!
//! `MockProvider` hands out in-memory connections that record every
//! statement they execute and count close calls, so tests can check the SQL
//! a DAO operation sends and that the connection was released on every path.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::{Connection, ConnectionProvider, Placeholder, QueryOutcome, Row, SqlValue, Statement};
use crate::error::{DaoError, Result};

#[derive(Debug, Default)]
struct MockState {
    tables: Vec<String>,
    executed: Vec<Statement>,
    table_checks: Vec<String>,
    outcomes: VecDeque<QueryOutcome>,
    acquire_count: usize,
    close_count: usize,
    fail_acquire: Option<String>,
    fail_execute: Option<String>,
}

/// In-memory `ConnectionProvider` for tests.
#[derive(Debug, Clone)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
    placeholder: Placeholder,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            placeholder: Placeholder::Positional,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tables `table_exists` reports as present.
    pub fn with_tables(self, tables: &[&str]) -> Self {
        self.lock().tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Queue the outcome of the next `execute`. Without a queued outcome,
    /// `SELECT` statements return no rows and other statements affect one row.
    pub fn push_outcome(self, outcome: QueryOutcome) -> Self {
        self.lock().outcomes.push_back(outcome);
        self
    }

    pub fn push_rows(self, rows: Vec<Row>) -> Self {
        self.push_outcome(QueryOutcome::Rows(rows))
    }

    /// Make every `acquire` fail with a connection error.
    pub fn fail_acquire(self, message: &str) -> Self {
        self.lock().fail_acquire = Some(message.to_string());
        self
    }

    /// Make every `execute` fail with a query execution error.
    pub fn fail_execute(self, message: &str) -> Self {
        self.lock().fail_execute = Some(message.to_string());
        self
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.lock().executed.clone()
    }

    pub fn last_statement(&self) -> Option<Statement> {
        self.lock().executed.last().cloned()
    }

    pub fn table_checks(&self) -> Vec<String> {
        self.lock().table_checks.clone()
    }

    pub fn acquire_count(&self) -> usize {
        self.lock().acquire_count
    }

    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }
}

impl ConnectionProvider for MockProvider {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        let mut state = self.lock();
        if let Some(message) = &state.fail_acquire {
            return Err(DaoError::Connection {
                target: "mock".to_string(),
                message: message.clone(),
            });
        }
        state.acquire_count += 1;
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
            placeholder: self.placeholder,
            open: true,
            last_error: String::new(),
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
    placeholder: Placeholder,
    open: bool,
    last_error: String,
}

impl MockConnection {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Connection for MockConnection {
    fn backend_name(&self) -> &'static str {
        "Mock"
    }

    fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome> {
        let result = {
            let mut state = self.lock();
            state.executed.push(Statement::new(sql, params.to_vec()));
            match state.fail_execute.clone() {
                Some(message) => Err(DaoError::QueryExecution { message }),
                None => Ok(state.outcomes.pop_front().unwrap_or_else(|| {
                    if sql.trim_start().to_ascii_uppercase().starts_with("SELECT") {
                        QueryOutcome::Rows(Vec::new())
                    } else {
                        QueryOutcome::Affected(1)
                    }
                })),
            }
        };
        if let Err(e) = &result {
            self.last_error = e.to_string();
        }
        result
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        let mut state = self.lock();
        state.table_checks.push(name.to_string());
        Ok(state.tables.iter().any(|t| t == name))
    }

    fn ping(&mut self) -> bool {
        self.open
    }

    fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.lock().close_count += 1;
        true
    }

    fn last_error(&self) -> &str {
        &self.last_error
    }
}
