mod cli_tests;
mod execute;
mod output;

pub use execute::SelectResult;

use clap::Args;

use crate::commands::args::WhereArgs;

/// Select all columns of the rows matching the given conditions
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quickdao select -t users                          # Every row
  quickdao select -t users -w 'age>18' -w 'name like v%'
  quickdao select -t users --raw-where 'age > 18' --format json")]
pub struct SelectCmd {
    /// Target table, optionally schema-qualified
    #[arg(short, long)]
    pub table: String,

    #[command(flatten)]
    pub filter: WhereArgs,
}
