use std::error::Error;

use super::DeleteCmd;
use crate::client::Client;
use crate::commands::{AffectedResult, Execute};
use crate::db::ConnectionProvider;

impl Execute for DeleteCmd {
    type Output = AffectedResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        if self.filter.is_empty() && !self.all {
            return Err(format!(
                "refusing to delete every row of '{}' without --all",
                self.table
            )
            .into());
        }
        let affected = client.delete(&self.table, &self.filter.to_conditions())?;
        Ok(AffectedResult::new("delete", self.table, affected))
    }
}
