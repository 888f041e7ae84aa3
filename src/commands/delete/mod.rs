mod execute;

use clap::Args;

use crate::commands::args::WhereArgs;

/// Delete rows matching the given conditions
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  quickdao delete -t users -w name=victor
  quickdao delete -t sessions -w 'attempts>=5'
  quickdao delete -t scratch --all           # Empty the table")]
pub struct DeleteCmd {
    /// Target table, optionally schema-qualified
    #[arg(short, long)]
    pub table: String,

    #[command(flatten)]
    pub filter: WhereArgs,

    /// Delete every row when no condition is given
    #[arg(long, default_value_t = false)]
    pub all: bool,
}
