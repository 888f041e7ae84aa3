use std::error::Error;

use serde::Serialize;
use serde_json::Value;

use super::ConfigureCmd;
use crate::client::Client;
use crate::commands::Execute;
use crate::config::Settings;
use crate::db::ConnectionProvider;

const MASK: &str = "********";

/// Settings persisted by a configure run, password masked.
#[derive(Debug, Serialize)]
pub struct ConfigureResult {
    pub path: String,
    pub settings: Settings,
}

impl ConfigureCmd {
    /// Only the flags that were passed; unset ones keep their stored value.
    fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        let text = [
            ("hostname", &self.hostname),
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                settings.insert(key.to_string(), Value::from(value.as_str()));
            }
        }
        if let Some(port) = self.port {
            settings.insert("port".to_string(), Value::from(port));
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.insert("connect_timeout_secs".to_string(), Value::from(secs));
        }
        if let Some(millis) = self.statement_timeout_ms {
            settings.insert("statement_timeout_ms".to_string(), Value::from(millis));
        }
        settings
    }
}

impl Execute for ConfigureCmd {
    type Output = ConfigureResult;

    fn execute<P: ConnectionProvider>(self, client: &Client<P>) -> Result<Self::Output, Box<dyn Error>> {
        let mut settings = client.config_store().read()?.unwrap_or_default();
        settings.extend(self.to_settings());
        client.configure(&settings)?;

        let mut settings = client.config_store().read()?.unwrap_or_default();
        if settings.contains_key("password") {
            settings.insert("password".to_string(), Value::from(MASK));
        }

        Ok(ConfigureResult {
            path: client.config_store().path().display().to_string(),
            settings,
        })
    }
}
