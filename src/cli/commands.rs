//! CLI command implementations
//!
//! - init: create the data directory and an empty record log
//! - serve: open the store and run the HTTP server until shutdown
//! - verify: read-only integrity check of the record log
//! - compact: rewrite the record log without superseded entries

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use super::args::Command;
use super::config::{Config, StorageKind};
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::http_server::{shutdown_signal, HttpServer};
use crate::observability::{init_logging, log_event, Event};
use crate::service::RecordService;
use crate::storage::{log_path, FileStore, MemoryStore, RecordStore};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(config.as_deref()),
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Verify { config } => verify(config.as_deref()),
        Command::Compact { config } => compact(config.as_deref()),
    }
}

/// Initialize a new data directory
///
/// Creates `<data_dir>/data/records.log` empty. Refuses to touch an
/// existing log.
pub fn init(config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let log = log_path(data_dir);
    if let Some(parent) = log.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", parent, e))
        })?;
    }

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&log)
        .and_then(|file| file.sync_all())
        .map_err(|e| CliError::io_error(format!("Failed to create log {:?}: {}", log, e)))?;

    write_response(json!({
        "initialized": true,
        "log_path": log.to_string_lossy(),
    }))?;

    Ok(())
}

/// Boot and serve HTTP until Ctrl-C or SIGTERM
///
/// Boot order:
/// 1. Configuration load and port overrides
/// 2. Logging
/// 3. Store open (log replay for file storage)
/// 4. HTTP listener
///
/// Any failure before the listener is bound aborts startup.
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    config.apply_env_overrides(port)?;

    init_logging(&config.log);
    log_event(Event::BootStart);
    info!(
        event = %Event::ConfigLoaded,
        storage = ?config.storage,
        data_dir = %config.data_dir,
        port = config.http.port,
        storage_timeout_ms = config.storage_timeout_ms
    );

    let store = open_store(&config)?;
    info!(
        event = %Event::StorageOpened,
        storage = ?config.storage,
        records = store.count().unwrap_or(0)
    );

    let service = RecordService::with_timeout(store, config.storage_timeout());
    let server = HttpServer::new(config.http.clone(), service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(server.start(shutdown_signal()))?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Check every entry of the record log and print a summary
pub fn verify(config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    let data_dir = require_file_storage(&config, "verify")?;

    let report = FileStore::verify(data_dir)?;
    write_response(serde_json::to_value(&report)?)?;

    Ok(())
}

/// Compact the record log and print a summary
pub fn compact(config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    let data_dir = require_file_storage(&config, "compact")?;

    let store = FileStore::open(data_dir)?;
    let report = store.compact()?;
    store.close()?;

    write_response(serde_json::to_value(&report)?)?;

    Ok(())
}

fn require_file_storage<'a>(config: &'a Config, command: &str) -> CliResult<&'a Path> {
    if config.storage != StorageKind::File {
        return Err(CliError::config_error(format!(
            "'{}' requires \"storage\": \"file\"",
            command
        )));
    }

    let data_dir = config.data_path();
    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    Ok(data_dir)
}

fn open_store(config: &Config) -> CliResult<Arc<dyn RecordStore>> {
    match config.storage {
        StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageKind::File => {
            let data_dir = config.data_path();
            if !is_initialized(data_dir) {
                return Err(CliError::not_initialized());
            }

            let store = FileStore::open(data_dir).map_err(|e| {
                if e.is_locked() {
                    CliError::from(e)
                } else {
                    CliError::boot_failed(format!("Failed to open storage: {}", e))
                }
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// Check if a data directory is initialized
fn is_initialized(data_dir: &Path) -> bool {
    log_path(data_dir).exists()
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir, storage: &str) -> PathBuf {
        let config_path = temp_dir.path().join("noteboard.json");
        let data_dir = temp_dir.path().join("data");

        let config = json!({
            "data_dir": data_dir.to_string_lossy(),
            "storage": storage
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_init_creates_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");

        init(Some(&config_path)).unwrap();

        let log = log_path(&temp_dir.path().join("data"));
        assert!(log.exists());
        assert_eq!(fs::metadata(&log).unwrap().len(), 0);
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");

        init(Some(&config_path)).unwrap();

        let result = init(Some(&config_path));
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_verify_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");

        let result = verify(Some(&config_path));
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_verify_rejects_memory_storage() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "memory");

        let result = verify(Some(&config_path));
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_verify_and_compact_after_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");
        init(Some(&config_path)).unwrap();

        {
            let store = FileStore::open(&temp_dir.path().join("data")).unwrap();
            let record = store.insert("draft", "").unwrap();
            store.update(&record.id, "final", "done").unwrap();
            store.close().unwrap();
        }

        verify(Some(&config_path)).unwrap();
        compact(Some(&config_path)).unwrap();

        let report = FileStore::verify(&temp_dir.path().join("data")).unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.live_records, 1);
    }

    #[test]
    fn test_verify_reports_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");
        init(Some(&config_path)).unwrap();

        let log = log_path(&temp_dir.path().join("data"));
        fs::write(&log, [0xFFu8; 64]).unwrap();

        let result = verify(Some(&config_path));
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::StorageFailed);
    }

    #[test]
    fn test_open_store_memory_needs_no_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "memory");
        let config = Config::load(&config_path).unwrap();

        let store = open_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_open_store_file_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");
        let config = Config::load(&config_path).unwrap();

        let result = open_store(&config);
        assert_eq!(result.err().unwrap().code(), &CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_compact_refused_while_store_is_open() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, "file");
        init(Some(&config_path)).unwrap();

        let live = FileStore::open(&temp_dir.path().join("data")).unwrap();
        live.insert("in flight", "").unwrap();

        let result = compact(Some(&config_path));
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::DataDirLocked);

        let config = Config::load(&config_path).unwrap();
        let result = open_store(&config);
        assert_eq!(result.err().unwrap().code(), &CliErrorCode::DataDirLocked);

        live.close().unwrap();
        compact(Some(&config_path)).unwrap();
    }
}
