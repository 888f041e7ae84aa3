mod execute;

use clap::Args;

use crate::commands::args::parse_assignment;
use crate::db::SqlValue;

/// Insert one row into a table
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quickdao insert -t users -s name=victor -s age=30
  quickdao insert -t users -s name=victor -s email=null   # Bind NULL
  quickdao insert -t codes -s code=\"'007'\"               # Quote to keep text")]
pub struct InsertCmd {
    /// Target table, optionally schema-qualified
    #[arg(short, long)]
    pub table: String,

    /// Column value as column=value (repeatable, bound in the given order)
    #[arg(short = 's', long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
    pub values: Vec<(String, SqlValue)>,
}
