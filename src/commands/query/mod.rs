mod cli_tests;
mod execute;
mod output;

pub use execute::QueryResult;

use clap::Args;

use crate::db::SqlValue;

/// Run a raw SQL statement with bound parameters
///
/// Parameters use the server's placeholder syntax ($1, $2, ... for PostgreSQL)
/// and are bound in the order given. No table check is made.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quickdao query --sql 'CREATE TABLE users (name text, age int)'
  quickdao query --sql 'SELECT * FROM users WHERE age > $1' -p 18
  quickdao query --sql 'UPDATE users SET age = $1 WHERE name = $2' -p 31 -p victor")]
pub struct QueryCmd {
    /// SQL statement to run
    #[arg(long)]
    pub sql: String,

    /// Positional parameter value (repeatable)
    #[arg(short, long = "param", value_name = "VALUE", value_parser = parse_param, allow_hyphen_values = true)]
    pub params: Vec<SqlValue>,
}

fn parse_param(input: &str) -> Result<SqlValue, String> {
    Ok(SqlValue::parse_literal(input))
}
