//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::config::ConfigStore;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the connection config file [default: $QUICKDAO_CONFIG or ./.quickdao.json]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Explicit `--config` wins over the environment and the default path.
    pub fn config_store(&self) -> ConfigStore {
        match &self.config {
            Some(path) => ConfigStore::new(path.clone()),
            None => ConfigStore::resolve(),
        }
    }
}
