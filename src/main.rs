use clap::Parser;
use tracing_subscriber::EnvFilter;

use quickdao::Client;
use quickdao::cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = Client::new(args.config_store());
    let output = args.command.run(&client, args.format)?;
    println!("{}", output);
    Ok(())
}
