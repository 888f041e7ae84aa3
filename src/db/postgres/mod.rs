//! PostgreSQL backend implementation.
//!
//! `PostgresConnector` owns one client connection. Construction:
//! 1. Connects to the maintenance database (no target database selected),
//!    falling back to `template1` and then to the target database itself
//!    when the server refuses `postgres`
//! 2. Ensures the target database exists, creating it if absent
//! 3. Reconnects with the target database selected, unless step 1 already
//!    landed there
//!
//! `PostgresProvider` builds a fresh connector for every `acquire`, reading
//! the config file each time when it is file-backed.

mod catalog;
mod conversion;

use std::time::Duration;

use postgres::error::SqlState;
use postgres::types::ToSql;
use postgres::{Client, NoTls};

use super::backend::{Connection, ConnectionProvider, QueryOutcome};
use super::query::Placeholder;
use super::value::SqlValue;
use crate::config::{ConfigStore, ConnectionConfig};
use crate::error::{DaoError, Result};

pub use catalog::{Catalog, PgCatalog, ensure_database};

/// Database every PostgreSQL server carries; used before the target
/// database is known to exist.
pub const MAINTENANCE_DATABASE: &str = "postgres";

/// Tried when the maintenance database is missing or not connectable.
const FALLBACK_DATABASE: &str = "template1";

/// Timeout for `ping`.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Prefer the server's message over the driver's wrapper text.
fn driver_message(e: &postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    }
}

fn try_open(config: &ConnectionConfig, dbname: &str) -> std::result::Result<Client, postgres::Error> {
    let mut pg = postgres::Config::new();
    pg.host(&config.hostname)
        .port(config.port)
        .user(&config.user)
        .password(&config.password)
        .dbname(dbname);

    if let Some(secs) = config.connect_timeout_secs {
        pg.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(millis) = config.statement_timeout_ms {
        pg.options(&format!("-c statement_timeout={}", millis));
    }

    tracing::debug!(host = %config.hostname, port = config.port, database = dbname, "connecting");

    pg.connect(NoTls)
}

fn connection_error(config: &ConnectionConfig, dbname: &str, e: &postgres::Error) -> DaoError {
    DaoError::Connection {
        target: format!("{}:{}/{}", config.hostname, config.port, dbname),
        message: driver_message(e),
    }
}

/// Open a client for `config` against `dbname`.
fn open_client(config: &ConnectionConfig, dbname: &str) -> Result<Client> {
    try_open(config, dbname).map_err(|e| connection_error(config, dbname, &e))
}

/// Server refusals that are specific to the database asked for, so another
/// database may still accept the same credentials.
fn should_fall_back(code: Option<&SqlState>) -> bool {
    matches!(
        code,
        Some(code) if *code == SqlState::INVALID_CATALOG_NAME
            || *code == SqlState::INSUFFICIENT_PRIVILEGE
            || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
    )
}

/// Databases to try, in order, when the maintenance database refuses us.
fn fallback_databases(target: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in [FALLBACK_DATABASE, target] {
        if name != MAINTENANCE_DATABASE && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Connect for the catalog step. Returns the client and the database it
/// landed on.
///
/// Only refusals that `should_fall_back` accepts move on to the next
/// database. Anything else, or running out of databases, reports the error
/// from the maintenance database.
fn open_admin(config: &ConnectionConfig) -> Result<(Client, String)> {
    let first = match try_open(config, MAINTENANCE_DATABASE) {
        Ok(client) => return Ok((client, MAINTENANCE_DATABASE.to_string())),
        Err(e) => e,
    };

    if should_fall_back(first.code()) {
        for dbname in fallback_databases(&config.database) {
            tracing::debug!(database = dbname, refused = %driver_message(&first), "trying fallback database");
            match try_open(config, dbname) {
                Ok(client) => return Ok((client, dbname.to_string())),
                Err(e) if should_fall_back(e.code()) => continue,
                Err(_) => break,
            }
        }
    }

    Err(connection_error(config, MAINTENANCE_DATABASE, &first))
}

/// A single PostgreSQL connection with the target database selected.
pub struct PostgresConnector {
    client: Option<Client>,
    database: String,
    last_error: String,
}

impl PostgresConnector {
    /// Connect, ensure the target database exists, then reconnect to it.
    ///
    /// # Errors
    /// - `Connection` if the server is unreachable, credentials are rejected,
    ///   or the reconnect to the target database fails
    /// - `DatabaseCreation` if the target database is missing and cannot be
    ///   created
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let (mut admin, admin_database) = open_admin(config)?;
        ensure_database(&mut PgCatalog::new(&mut admin), &config.database)?;

        let client = if admin_database == config.database {
            admin
        } else {
            if let Err(e) = admin.close() {
                tracing::debug!(error = %e, "failed to close maintenance connection");
            }
            // A failure here means the database vanished or is not accessible
            // between the two steps; treated as fatal like any other connect error
            open_client(config, &config.database)?
        };

        Ok(Self {
            client: Some(client),
            database: config.database.clone(),
            last_error: String::new(),
        })
    }

    /// Load the config from `store` and connect.
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        Self::connect(&store.load()?)
    }

    /// Name of the selected database.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Make sure database `name` exists on this server. Returns whether it
    /// was created.
    pub fn ensure_database(&mut self, name: &str) -> Result<bool> {
        let result = match self.client.as_mut() {
            Some(client) => ensure_database(&mut PgCatalog::new(client), name),
            None => Err(closed_error()),
        };
        self.record(result)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.last_error = e.to_string();
        }
        result
    }

    fn run(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome> {
        let client = self.client.as_mut().ok_or_else(closed_error)?;

        tracing::debug!(sql, params = params.len(), "executing statement");

        let statement = client.prepare(sql).map_err(|e| DaoError::QueryPrepare {
            message: driver_message(&e),
        })?;

        let expected = statement.params();
        if expected.len() != params.len() {
            return Err(DaoError::QueryExecution {
                message: format!(
                    "statement expects {} parameters, got {}",
                    expected.len(),
                    params.len()
                ),
            });
        }

        let bound = conversion::bind_params(params, expected)
            .map_err(|message| DaoError::QueryExecution { message })?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p.as_ref()).collect();

        if statement.columns().is_empty() {
            let affected = client.execute(&statement, &refs).map_err(|e| DaoError::QueryExecution {
                message: driver_message(&e),
            })?;
            Ok(QueryOutcome::Affected(affected))
        } else {
            let rows = client.query(&statement, &refs).map_err(|e| DaoError::QueryExecution {
                message: driver_message(&e),
            })?;
            let records = rows
                .iter()
                .map(conversion::row_to_record)
                .collect::<std::result::Result<Vec<_>, String>>()
                .map_err(|message| DaoError::QueryExecution { message })?;
            Ok(QueryOutcome::Rows(records))
        }
    }
}

fn closed_error() -> DaoError {
    DaoError::QueryExecution {
        message: "connection is closed".to_string(),
    }
}

impl Connection for PostgresConnector {
    fn backend_name(&self) -> &'static str {
        "Postgres"
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Numbered
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome> {
        let result = self.run(sql, params);
        self.record(result)
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        let result = match self.client.as_mut() {
            Some(client) => catalog::table_exists(client, name).map_err(|e| DaoError::QueryExecution {
                message: format!("failed to check table '{}': {}", name, driver_message(&e)),
            }),
            None => Err(closed_error()),
        };
        self.record(result)
    }

    fn ping(&mut self) -> bool {
        match self.client.as_mut() {
            Some(client) => match client.is_valid(PING_TIMEOUT) {
                Ok(()) => true,
                Err(e) => {
                    self.last_error = driver_message(&e);
                    false
                }
            },
            None => false,
        }
    }

    fn close(&mut self) -> bool {
        match self.client.take() {
            Some(client) => match client.close() {
                Ok(()) => true,
                Err(e) => {
                    self.last_error = driver_message(&e);
                    false
                }
            },
            None => false,
        }
    }

    fn last_error(&self) -> &str {
        &self.last_error
    }
}

/// Where a provider gets its connection settings.
#[derive(Debug, Clone)]
enum ConfigSource {
    /// Re-read the config file on every acquire.
    Store(ConfigStore),
    Fixed(ConnectionConfig),
}

/// Opens a fresh `PostgresConnector` per acquire. No pooling.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    source: ConfigSource,
}

impl PostgresProvider {
    pub fn from_store(store: ConfigStore) -> Self {
        Self {
            source: ConfigSource::Store(store),
        }
    }

    pub fn from_config(config: ConnectionConfig) -> Self {
        Self {
            source: ConfigSource::Fixed(config),
        }
    }
}

impl ConnectionProvider for PostgresProvider {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        let connector = match &self.source {
            ConfigSource::Store(store) => PostgresConnector::from_store(store)?,
            ConfigSource::Fixed(config) => PostgresConnector::connect(config)?,
        };
        Ok(Box::new(connector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case(Some(&SqlState::INVALID_CATALOG_NAME), true)]
    #[case(Some(&SqlState::INSUFFICIENT_PRIVILEGE), true)]
    #[case(Some(&SqlState::INVALID_AUTHORIZATION_SPECIFICATION), true)]
    #[case(Some(&SqlState::INVALID_PASSWORD), false)]
    #[case(Some(&SqlState::TOO_MANY_CONNECTIONS), false)]
    #[case(None, false)]
    fn test_should_fall_back(#[case] code: Option<&SqlState>, #[case] expected: bool) {
        assert_eq!(should_fall_back(code), expected);
    }

    #[rstest]
    #[case("app_db", vec!["template1", "app_db"])]
    #[case("postgres", vec!["template1"])]
    #[case("template1", vec!["template1"])]
    fn test_fallback_databases(#[case] target: &str, #[case] expected: Vec<&str>) {
        assert_eq!(fallback_databases(target), expected);
    }

    #[test]
    fn test_acquire_without_config_is_configuration_missing() {
        let dir = tempdir().unwrap();
        let provider = PostgresProvider::from_store(ConfigStore::new(dir.path().join("none.json")));
        let err = provider.acquire().err().unwrap();
        assert!(matches!(err, DaoError::ConfigurationMissing { .. }));
    }

    #[test]
    fn test_unreachable_server_is_connection_error() {
        // Port 1 on localhost refuses connections
        let config = ConnectionConfig::new("127.0.0.1", "app", "secret", "app_db", 1).with_connect_timeout(1);
        let err = PostgresProvider::from_config(config).acquire().err().unwrap();
        match err {
            DaoError::Connection { target, .. } => assert_eq!(target, "127.0.0.1:1/postgres"),
            other => panic!("Expected Connection error, got {:?}", other),
        }
    }
}
