//! Public entry point.
//!
//! A `Client` bundles a config store with a connection provider. It holds no
//! connection between calls; every operation acquires and releases its own.
//! Several clients with different configs can live in one process.

use crate::config::{ConfigStore, Settings};
use crate::dao::RecordDao;
use crate::db::{Condition, ConnectionProvider, PostgresProvider, QueryOutcome, Record, Row, SqlValue};
use crate::error::Result;

pub struct Client<P = PostgresProvider> {
    store: ConfigStore,
    dao: RecordDao<P>,
}

impl Client<PostgresProvider> {
    /// Client backed by the config file at `store`, re-read on every call.
    pub fn new(store: ConfigStore) -> Self {
        let provider = PostgresProvider::from_store(store.clone());
        Self::with_provider(store, provider)
    }

    /// Client using the config file resolved from the environment.
    pub fn from_env() -> Self {
        Self::new(ConfigStore::resolve())
    }
}

impl<P: ConnectionProvider> Client<P> {
    /// Client with a custom provider, e.g. a pool or a test double.
    pub fn with_provider(store: ConfigStore, provider: P) -> Self {
        Self {
            store,
            dao: RecordDao::new(provider),
        }
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn provider(&self) -> &P {
        self.dao.provider()
    }

    /// Validate and merge connection settings into the config file.
    pub fn configure(&self, settings: &Settings) -> Result<()> {
        self.store.configure(settings)
    }

    pub fn insert(&self, table: &str, values: &Record) -> Result<u64> {
        self.dao.insert(table, values)
    }

    pub fn update(&self, table: &str, values: &Record, conditions: &[Condition]) -> Result<u64> {
        self.dao.update(table, values, conditions)
    }

    pub fn delete(&self, table: &str, conditions: &[Condition]) -> Result<u64> {
        self.dao.delete(table, conditions)
    }

    pub fn select(&self, table: &str, conditions: &[Condition]) -> Result<Vec<Row>> {
        self.dao.select(table, conditions)
    }

    /// Raw SQL passthrough. Returns rows or an affected-row count.
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome> {
        self.dao.execute(sql, params)
    }
}
