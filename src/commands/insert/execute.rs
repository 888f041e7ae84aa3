use std::error::Error;

use super::InsertCmd;
use crate::client::Client;
use crate::commands::args::to_record;
use crate::commands::{AffectedResult, Execute};
use crate::db::ConnectionProvider;

impl Execute for InsertCmd {
    type Output = AffectedResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        let affected = client.insert(&self.table, &to_record(&self.values))?;
        Ok(AffectedResult::new("insert", self.table, affected))
    }
}
