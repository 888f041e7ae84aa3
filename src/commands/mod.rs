//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` impl that runs it through a `Client`
//! - An `Outputable` impl for its result

mod affected;
pub mod args;
mod configure;
mod delete;
mod insert;
mod query;
mod select;
mod update;

pub use affected::AffectedResult;
pub use configure::{ConfigureCmd, ConfigureResult};
pub use delete::DeleteCmd;
pub use insert::InsertCmd;
pub use query::{QueryCmd, QueryResult};
pub use select::{SelectCmd, SelectResult};
pub use update::UpdateCmd;

use clap::Subcommand;
use std::error::Error;

use crate::client::Client;
use crate::db::ConnectionProvider;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store connection settings in the config file
    Configure(ConfigureCmd),

    /// Insert one row into a table
    Insert(InsertCmd),

    /// Select rows from a table
    Select(SelectCmd),

    /// Update rows in a table
    Update(UpdateCmd),

    /// Delete rows from a table
    Delete(DeleteCmd),

    /// Run a raw SQL statement with bound parameters
    Query(QueryCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run<P: ConnectionProvider>(
        self,
        client: &Client<P>,
        format: OutputFormat,
    ) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Configure(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Insert(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Select(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Update(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Delete(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Query(cmd) => Ok(cmd.execute(client)?.format(format)),
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().cloned().unwrap_or_default()).into())
            }
        }
    }
}
