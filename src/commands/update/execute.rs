use std::error::Error;

use super::UpdateCmd;
use crate::client::Client;
use crate::commands::args::to_record;
use crate::commands::{AffectedResult, Execute};
use crate::db::ConnectionProvider;

impl Execute for UpdateCmd {
    type Output = AffectedResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        let affected = client.update(&self.table, &to_record(&self.values), &self.filter.to_conditions())?;
        Ok(AffectedResult::new("update", self.table, affected))
    }
}
