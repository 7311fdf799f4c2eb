use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::backend::{BackendKind, ConnectParams};
use crate::util::error;

/// Names the JSON file to load the configuration from.
pub const CONFIG_PATH_VAR: &str = "VIZQL_CONFIG";
/// Overrides the configured log filter.
pub const LOG_FILTER_VAR: &str = "VIZQL_LOG";

pub const DEFAULT_LOG_FILTER: &str = "info,vizql_lib=debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Application configuration. Every field has a default so a partial file is valid.
pub struct Config {
    pub backend: BackendKind,
    /// Values used to prefill the connection form. Unset means the defaults of the backend kind.
    pub connection: Option<ConnectParams>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::default(),
            connection: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn connection_defaults(&self) -> ConnectParams {
        match &self.connection {
            Some(params) => params.clone(),
            None => self.backend.default_params(),
        }
    }

    /// Reads a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, error::Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| error::Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        return serde_json::from_str(&text)
            .map_err(|e| error::Error::ConfigError(format!("{}: {}", path.display(), e)));
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Config, error::Error> {
        return Self::from_lookup(|key| std::env::var(key).ok());
    }

    /// Builds the configuration using `lookup` to resolve environment variables.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Config, error::Error> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => Self::load(path.trim())?,
            _ => Config::default(),
        };
        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            if !filter.trim().is_empty() {
                config.log_filter = filter.trim().to_string();
            }
        }
        return Ok(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend, BackendKind::Postgres);
        assert_eq!(config.connection_defaults().host, "localhost");
        assert_eq!(config.connection_defaults().port, 5432);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "connection": {{ "dbname": "inventory", "port": 6543 }} }}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = Config::from_lookup(|key| match key {
            CONFIG_PATH_VAR => Some(path.clone()),
            _ => None,
        }).unwrap();
        let connection = config.connection_defaults();
        assert_eq!(connection.dbname, "inventory");
        assert_eq!(connection.port, 6543);
        assert_eq!(connection.host, "localhost");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn log_filter_override() {
        let config = Config::from_lookup(|key| match key {
            LOG_FILTER_VAR => Some("warn".to_string()),
            _ => None,
        }).unwrap();
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn sqlite_backend_prefills_an_in_memory_database() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "backend": "sqlite" }}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = Config::from_lookup(|key| match key {
            CONFIG_PATH_VAR => Some(path.clone()),
            _ => None,
        }).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.connection_defaults(), ConnectParams::sqlite(":memory:"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = Config::from_lookup(|key| match key {
            CONFIG_PATH_VAR => Some("/definitely/not/here/vizql.json".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(error::Error::ConfigError(_))));
    }
}
