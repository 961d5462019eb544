//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::http_server::ServerError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, filesystem)
    IoError,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// Boot failed
    BootFailed,
    /// Storage check or maintenance failed
    StorageFailed,
    /// Data directory held by another process
    DataDirLocked,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "NOTEBOARD_CLI_CONFIG_ERROR",
            Self::IoError => "NOTEBOARD_CLI_IO_ERROR",
            Self::AlreadyInitialized => "NOTEBOARD_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "NOTEBOARD_CLI_NOT_INITIALIZED",
            Self::BootFailed => "NOTEBOARD_CLI_BOOT_FAILED",
            Self::StorageFailed => "NOTEBOARD_CLI_STORAGE_FAILED",
            Self::DataDirLocked => "NOTEBOARD_CLI_DATA_DIR_LOCKED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'noteboard init' first.",
        )
    }

    pub fn data_dir_locked(detail: impl Into<String>) -> Self {
        Self::new(
            CliErrorCode::DataDirLocked,
            format!(
                "Data directory is in use by another noteboard process; stop it first ({})",
                detail.into()
            ),
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        if e.is_locked() {
            return Self::data_dir_locked(e.details().unwrap_or_default());
        }
        Self::new(CliErrorCode::StorageFailed, e.to_string())
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        Self::boot_failed(format!("HTTP server failed: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
