mod execute;
mod output;

pub use execute::ConfigureResult;

use clap::Args;

/// Store connection settings in the config file
///
/// Settings are merged into the existing file. A new file must end up with
/// every required field; missing ones are reported by name.
#[derive(Args, Debug, Default)]
#[command(after_help = "\
Examples:
  quickdao configure --hostname localhost --user app --password secret --database app_db --port 5432
  quickdao configure --database reporting           # Switch database, keep the rest
  quickdao configure --statement-timeout-ms 5000    # Bound every statement to 5s")]
pub struct ConfigureCmd {
    /// Database server host name or address
    #[arg(long)]
    pub hostname: Option<String>,

    /// Login user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password
    #[arg(long)]
    pub password: Option<String>,

    /// Target database, created on first connect when missing
    #[arg(short, long)]
    pub database: Option<String>,

    /// Server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds to wait for the server to accept a connection
    #[arg(long)]
    pub connect_timeout_secs: Option<u64>,

    /// Server-side statement timeout in milliseconds
    #[arg(long)]
    pub statement_timeout_ms: Option<u64>,
}
