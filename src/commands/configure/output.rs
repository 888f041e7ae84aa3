//! Output formatting for configure command results.

use super::execute::ConfigureResult;
use crate::output::Outputable;

impl Outputable for ConfigureResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("Configuration written to {}", self.path), String::new()];

        let width = self.settings.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in &self.settings {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("  {:<width$}  {}", key, value, width = width));
        }

        lines.join("\n")
    }
}
