use std::error::Error;

use serde::Serialize;

use super::QueryCmd;
use crate::client::Client;
use crate::commands::Execute;
use crate::db::{ConnectionProvider, QueryOutcome, Row};

/// Outcome of a raw statement: result rows, or an affected-row count for
/// statements that return none.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
}

impl Execute for QueryCmd {
    type Output = QueryResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        let (rows, affected) = match client.query(&self.sql, &self.params)? {
            QueryOutcome::Rows(rows) => (Some(rows), None),
            QueryOutcome::Affected(n) => (None, Some(n)),
        };
        Ok(QueryResult {
            sql: self.sql,
            rows,
            affected,
        })
    }
}
