//! Configuration file handling for database connections.
//!
//! Connection settings live in a pretty-printed JSON object (`.quickdao.json`
//! by default). `configure` merges new settings into whatever is already
//! persisted; `load` reads the file again on every call, so a running client
//! always connects with the latest settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DaoError, Result};

/// Default config file name, resolved against the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".quickdao.json";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "QUICKDAO_CONFIG";

/// Keys every config must carry before a connection is attempted.
pub const REQUIRED_FIELDS: [&str; 5] = ["hostname", "user", "password", "database", "port"];

/// Raw settings object as stored on disk.
pub type Settings = Map<String, Value>;

/// Typed connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// Seconds to wait for the server to accept a connection. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Server-side statement timeout in milliseconds. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_timeout_ms: Option<u64>,
}

impl ConnectionConfig {
    pub fn new(
        hostname: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port,
            connect_timeout_secs: None,
            statement_timeout_ms: None,
        }
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    pub fn with_statement_timeout(mut self, millis: u64) -> Self {
        self.statement_timeout_ms = Some(millis);
        self
    }

    /// `host:port/database`, used in log lines and connection errors.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.hostname, self.port, self.database)
    }

    /// Convert to the raw settings object accepted by `ConfigStore::configure`.
    pub fn to_settings(&self) -> Settings {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Settings::new(),
        }
    }
}

/// Reads and writes the JSON config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the config file.
    ///
    /// Priority: `QUICKDAO_CONFIG` environment variable > `.quickdao.json` in
    /// the current directory.
    pub fn resolve() -> Self {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate `settings` and merge them into the persisted config.
    ///
    /// Keys already on disk are kept unless `settings` carries the same key.
    /// Nothing is written when a required key is missing.
    pub fn configure(&self, settings: &Settings) -> Result<()> {
        validate_required(settings)?;

        let mut merged = self.read()?.unwrap_or_default();
        for (key, value) in settings {
            merged.insert(key.clone(), value.clone());
        }

        let content = serde_json::to_string_pretty(&Value::Object(merged)).map_err(|e| {
            DaoError::ConfigDecode {
                path: self.display_path(),
                message: e.to_string(),
            }
        })?;

        fs::write(&self.path, content).map_err(|source| DaoError::ConfigIo {
            path: self.display_path(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "wrote connection config");
        Ok(())
    }

    /// Return the persisted settings, or `None` when no file exists yet.
    pub fn read(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| DaoError::ConfigIo {
            path: self.display_path(),
            source,
        })?;

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(DaoError::ConfigDecode {
                path: self.display_path(),
                message: "expected a JSON object".to_string(),
            }),
            Err(e) => Err(DaoError::ConfigDecode {
                path: self.display_path(),
                message: e.to_string(),
            }),
        }
    }

    /// Read and decode the typed connection config.
    pub fn load(&self) -> Result<ConnectionConfig> {
        let settings = self.read()?.ok_or_else(|| DaoError::ConfigurationMissing {
            path: self.display_path(),
        })?;

        validate_required(&settings)?;

        serde_json::from_value(Value::Object(settings)).map_err(|e| DaoError::ConfigDecode {
            path: self.display_path(),
            message: e.to_string(),
        })
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fail with `MissingField` naming the first required key that is absent or null.
fn validate_required(settings: &Settings) -> Result<()> {
    for field in REQUIRED_FIELDS {
        match settings.get(field) {
            None | Some(Value::Null) => {
                return Err(DaoError::MissingField {
                    field: field.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    // Serializes tests that modify the process environment
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected a JSON object"),
        }
    }

    fn full_settings() -> Settings {
        settings(json!({
            "hostname": "localhost",
            "user": "app",
            "password": "secret",
            "database": "app_db",
            "port": 5432
        }))
    }

    #[rstest]
    fn test_read_without_file_is_none(temp_dir: TempDir) {
        let store = ConfigStore::new(temp_dir.path().join("missing.json"));
        assert!(store.read().unwrap().is_none());
    }

    #[rstest]
    fn test_configure_then_read_round_trip(temp_dir: TempDir) {
        let store = ConfigStore::new(temp_dir.path().join("db.json"));
        store.configure(&full_settings()).unwrap();

        let stored = store.read().unwrap().unwrap();
        assert_eq!(stored, full_settings());
    }

    #[rstest]
    fn test_configure_merges_with_existing(temp_dir: TempDir) {
        let store = ConfigStore::new(temp_dir.path().join("db.json"));
        let mut first = full_settings();
        first.insert("statement_timeout_ms".into(), json!(500));
        store.configure(&first).unwrap();

        let mut second = full_settings();
        second.insert("database".into(), json!("other_db"));
        store.configure(&second).unwrap();

        let stored = store.read().unwrap().unwrap();
        assert_eq!(stored.get("database"), Some(&json!("other_db")));
        assert_eq!(stored.get("statement_timeout_ms"), Some(&json!(500)));
        assert_eq!(stored.get("hostname"), Some(&json!("localhost")));
    }

    #[rstest]
    #[case("hostname")]
    #[case("user")]
    #[case("password")]
    #[case("database")]
    #[case("port")]
    fn test_configure_missing_field_fails_without_write(temp_dir: TempDir, #[case] field: &str) {
        let path = temp_dir.path().join("db.json");
        let store = ConfigStore::new(&path);
        let mut partial = full_settings();
        partial.remove(field);

        let err = store.configure(&partial).unwrap_err();
        match err {
            DaoError::MissingField { field: missing } => assert_eq!(missing, field),
            other => panic!("Expected MissingField, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[rstest]
    fn test_configure_missing_field_keeps_existing_file(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        let store = ConfigStore::new(&path);
        store.configure(&full_settings()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut partial = full_settings();
        partial.remove("password");
        partial.insert("user".into(), json!("intruder"));
        assert!(store.configure(&partial).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[rstest]
    fn test_configure_writes_pretty_json(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        ConfigStore::new(&path).configure(&full_settings()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"hostname\": \"localhost\""));
    }

    #[rstest]
    fn test_read_invalid_json_is_decode_error(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ConfigStore::new(&path).read().unwrap_err();
        assert!(matches!(err, DaoError::ConfigDecode { .. }));
    }

    #[rstest]
    fn test_read_non_object_is_decode_error(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = ConfigStore::new(&path).read().unwrap_err();
        assert!(matches!(err, DaoError::ConfigDecode { .. }));
    }

    #[rstest]
    fn test_load_without_file_is_configuration_missing(temp_dir: TempDir) {
        let err = ConfigStore::new(temp_dir.path().join("db.json")).load().unwrap_err();
        assert!(matches!(err, DaoError::ConfigurationMissing { .. }));
    }

    #[rstest]
    fn test_load_decodes_typed_config(temp_dir: TempDir) {
        let store = ConfigStore::new(temp_dir.path().join("db.json"));
        let mut with_timeout = full_settings();
        with_timeout.insert("connect_timeout_secs".into(), json!(3));
        store.configure(&with_timeout).unwrap();

        let config = store.load().unwrap();
        assert_eq!(
            config,
            ConnectionConfig::new("localhost", "app", "secret", "app_db", 5432).with_connect_timeout(3)
        );
    }

    #[rstest]
    fn test_load_rejects_wrong_port_type(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        let mut bad = full_settings();
        bad.insert("port".into(), json!("not a port"));
        fs::write(&path, serde_json::to_string(&Value::Object(bad)).unwrap()).unwrap();

        let err = ConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DaoError::ConfigDecode { .. }));
    }

    #[rstest]
    fn test_load_reports_missing_field_in_file(temp_dir: TempDir) {
        let path = temp_dir.path().join("db.json");
        fs::write(&path, r#"{ "hostname": "localhost", "user": "app" }"#).unwrap();

        let err = ConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DaoError::MissingField { ref field } if field == "password"));
    }

    #[rstest]
    fn test_to_settings_round_trips_through_store(temp_dir: TempDir) {
        let store = ConfigStore::new(temp_dir.path().join("db.json"));
        let config = ConnectionConfig::new("db.internal", "svc", "pw", "orders", 6543).with_statement_timeout(250);
        store.configure(&config.to_settings()).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[rstest]
    fn test_target_format() {
        let config = ConnectionConfig::new("localhost", "app", "secret", "app_db", 5432);
        assert_eq!(config.target(), "localhost:5432/app_db");
    }

    #[rstest]
    fn test_resolve_uses_env_var() {
        let _lock = env_lock().lock();
        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, "/tmp/quickdao-test.json");
        }
        let store = ConfigStore::resolve();
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
        assert_eq!(store.path(), Path::new("/tmp/quickdao-test.json"));
    }

    #[rstest]
    fn test_resolve_default_path() {
        let _lock = env_lock().lock();
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
        assert_eq!(ConfigStore::resolve().path(), Path::new(DEFAULT_CONFIG_FILE));
    }
}
