//! Configuration file handling
//!
//! Every field has a default, so a missing file at the default path is
//! not an error. An explicitly named file must exist.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::observability::LogConfig;

/// Config file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./noteboard.json";

/// Environment variable overriding `http.port`
pub const PORT_ENV: &str = "PORT";

/// Backing store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Durable append-only log under `data_dir`
    File,
    /// Volatile, lost on exit
    Memory,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (default: "./noteboard-data")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Backing store (default: file)
    #[serde(default = "default_storage")]
    pub storage: StorageKind,

    /// Upper bound on a single store call (default: 5000)
    #[serde(default = "default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_data_dir() -> String {
    "./noteboard-data".to_string()
}
fn default_storage() -> StorageKind {
    StorageKind::File
}
fn default_storage_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            storage_timeout_ms: default_storage_timeout_ms(),
            http: HttpServerConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads the named file, or the default path if it exists, or the
    /// built-in defaults.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.storage_timeout_ms == 0 {
            return Err(CliError::config_error("storage_timeout_ms must be > 0"));
        }

        if self.storage == StorageKind::File && self.data_dir.trim().is_empty() {
            return Err(CliError::config_error(
                "data_dir must not be empty for file storage",
            ));
        }

        if self.log.level.trim().is_empty() {
            return Err(CliError::config_error("log.level must not be empty"));
        }

        Ok(())
    }

    /// Applies the port overrides: `$PORT` beats the file, `--port` beats
    /// both.
    pub fn apply_port_override(
        &mut self,
        env_port: Option<&str>,
        flag_port: Option<u16>,
    ) -> CliResult<()> {
        if let Some(raw) = env_port {
            self.http.port = raw.trim().parse().map_err(|_| {
                CliError::config_error(format!("Invalid {} value: '{}'", PORT_ENV, raw))
            })?;
        }

        if let Some(port) = flag_port {
            self.http.port = port;
        }

        Ok(())
    }

    /// Reads `$PORT` from the process environment and applies it together
    /// with the flag.
    pub fn apply_env_overrides(&mut self, flag_port: Option<u16>) -> CliResult<()> {
        let env_port = env::var(PORT_ENV).ok();
        self.apply_port_override(env_port.as_deref(), flag_port)
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::LogFormat;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = temp_dir.path().join("noteboard.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({}));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, "./noteboard-data");
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.storage_timeout_ms, 5000);
        assert_eq!(config.http.port, 5000);
        assert!(config.http.cors_origins.is_empty());
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_config_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            json!({
                "data_dir": "/var/lib/noteboard",
                "storage": "memory",
                "storage_timeout_ms": 250,
                "http": { "host": "127.0.0.1", "port": 9000, "cors_origins": ["http://localhost:3000"] },
                "log": { "level": "debug", "format": "pretty" }
            }),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.storage_timeout(), Duration::from_millis(250));
        assert_eq!(config.http.socket_addr(), "127.0.0.1:9000");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "storage_timeout_ms": 0 }));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_rejects_unknown_storage() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "storage": "postgres" }));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_rejects_unknown_log_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "log": { "format": "xml" } }));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json");
        assert!(Config::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_port_precedence() {
        let mut config = Config::default();

        config.apply_port_override(Some("7000"), None).unwrap();
        assert_eq!(config.http.port, 7000);

        config.apply_port_override(Some("7000"), Some(8000)).unwrap();
        assert_eq!(config.http.port, 8000);
    }

    #[test]
    fn test_invalid_port_env_rejected() {
        let mut config = Config::default();
        assert!(config.apply_port_override(Some("http"), None).is_err());
        assert_eq!(config.http.port, 5000);
    }
}
