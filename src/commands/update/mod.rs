mod execute;

use clap::Args;

use crate::commands::args::{WhereArgs, parse_assignment};
use crate::db::SqlValue;

/// Update rows matching the given conditions
///
/// Without any condition every row in the table is updated.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quickdao update -t users -s age=31 -w name=victor
  quickdao update -t users -s active=false -w 'age<18' -w 'email like %@old.example'
  quickdao update -t users -s age=31 --raw-where \"name = 'victor'\"")]
pub struct UpdateCmd {
    /// Target table, optionally schema-qualified
    #[arg(short, long)]
    pub table: String,

    /// New value as column=value (repeatable)
    #[arg(short = 's', long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
    pub values: Vec<(String, SqlValue)>,

    #[command(flatten)]
    pub filter: WhereArgs,
}
