//! Observability: structured logging and lifecycle events
//!
//! Logging goes through `tracing`. `init_logging` installs a
//! `tracing-subscriber` formatter once per process; `RUST_LOG` overrides
//! the configured level when set.
//!
//! # Usage
//!
//! ```ignore
//! use noteboard::observability::{init_logging, log_event, Event, LogConfig};
//!
//! init_logging(&LogConfig::default());
//! log_event(Event::BootStart);
//! ```

mod events;

pub use events::Event;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-line output
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level filter (default: "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format (default: json)
    #[serde(default = "default_format")]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by
/// an earlier call in the same test binary).
pub fn init_logging(config: &LogConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(false);

    match config.format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    tracing::info!(event = %event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_parses_lowercase() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "pretty"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(serde_json::from_str::<LogConfig>(r#"{"format": "xml"}"#).is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(&LogConfig::default());
        assert!(!init_logging(&LogConfig::default()));
        log_event(Event::BootStart);
    }
}
