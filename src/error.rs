//! Error taxonomy shared by the config store, connector and DAO layers.
//!
//! Every variant names the stage that failed (config, connect, ensure-database,
//! prepare, execute) so callers can tell where an operation stopped. Driver
//! messages are carried as strings; the connector also keeps the most recent
//! one available through `Connection::last_error`.

use thiserror::Error;

/// Errors produced by quickdao operations.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Connection is not configured: no config file at '{path}'")]
    ConfigurationMissing { path: String },

    #[error("Invalid config file '{path}': {message}")]
    ConfigDecode { path: String, message: String },

    #[error("Missing required config field '{field}'")]
    MissingField { field: String },

    #[error("Failed to access config file '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to {target}: {message}")]
    Connection { target: String, message: String },

    #[error("Failed to create database '{database}': {message}")]
    DatabaseCreation { database: String, message: String },

    #[error("Table '{table}' does not exist")]
    TableNotFound { table: String },

    #[error("No column values given for {operation} on '{table}'")]
    EmptyInput { operation: &'static str, table: String },

    #[error("Invalid identifier '{name}'")]
    InvalidIdentifier { name: String },

    #[error("Failed to prepare statement: {message}")]
    QueryPrepare { message: String },

    #[error("Query failed: {message}")]
    QueryExecution { message: String },
}

impl DaoError {
    /// Short name of the stage the error came from.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. }
            | Self::ConfigDecode { .. }
            | Self::MissingField { .. }
            | Self::ConfigIo { .. } => "config",
            Self::Connection { .. } => "connect",
            Self::DatabaseCreation { .. } => "ensure-database",
            Self::TableNotFound { .. } | Self::EmptyInput { .. } | Self::InvalidIdentifier { .. } => {
                "validate"
            }
            Self::QueryPrepare { .. } => "prepare",
            Self::QueryExecution { .. } => "execute",
        }
    }
}

pub type Result<T> = std::result::Result<T, DaoError>;
