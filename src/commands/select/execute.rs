use std::error::Error;

use serde::Serialize;

use super::SelectCmd;
use crate::client::Client;
use crate::commands::Execute;
use crate::db::{ConnectionProvider, Row};

/// Rows returned by a select, in server order.
#[derive(Debug, Serialize)]
pub struct SelectResult {
    pub table: String,
    pub count: usize,
    pub rows: Vec<Row>,
}

impl Execute for SelectCmd {
    type Output = SelectResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        let rows = client.select(&self.table, &self.filter.to_conditions())?;
        Ok(SelectResult {
            table: self.table,
            count: rows.len(),
            rows,
        })
    }
}
