//! Storage error types
//!
//! Error codes:
//! - NOTEBOARD_STORAGE_IO_ERROR (ERROR severity)
//! - NOTEBOARD_STORAGE_UNAVAILABLE (ERROR severity)
//! - NOTEBOARD_RECORD_NOT_FOUND (ERROR severity)
//! - NOTEBOARD_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The store cannot be opened
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure while reading or appending the log
    StorageIoError,
    /// Store closed, lock poisoned, or otherwise unusable
    StorageUnavailable,
    /// No live record with the requested id
    RecordNotFound,
    /// Log entry failed checksum or framing validation
    DataCorruption,
    /// Another process holds the data directory
    StorageLocked,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageIoError => "NOTEBOARD_STORAGE_IO_ERROR",
            StorageErrorCode::StorageUnavailable => "NOTEBOARD_STORAGE_UNAVAILABLE",
            StorageErrorCode::RecordNotFound => "NOTEBOARD_RECORD_NOT_FOUND",
            StorageErrorCode::DataCorruption => "NOTEBOARD_DATA_CORRUPTION",
            StorageErrorCode::StorageLocked => "NOTEBOARD_STORAGE_LOCKED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// I/O failure on the backing file
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::StorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Store cannot serve the request (closed, poisoned lock, timeout)
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::StorageUnavailable,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// No live record with this id
    pub fn not_found(id: impl fmt::Display) -> Self {
        Self {
            code: StorageErrorCode::RecordNotFound,
            message: "Record not found".to_string(),
            details: Some(format!("id: {}", id)),
            source: None,
        }
    }

    /// The data directory lock is held elsewhere
    pub fn locked(lock_path: impl fmt::Display) -> Self {
        Self {
            code: StorageErrorCode::StorageLocked,
            message: "Data directory is in use by another process".to_string(),
            details: Some(format!("lock: {}", lock_path)),
            source: None,
        }
    }

    /// Create a data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the error means the record does not exist
    pub fn is_not_found(&self) -> bool {
        self.code == StorageErrorCode::RecordNotFound
    }

    pub fn is_locked(&self) -> bool {
        self.code == StorageErrorCode::StorageLocked
    }

    /// Returns whether this error prevents the store from opening
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StorageErrorCode::StorageIoError.code(),
            "NOTEBOARD_STORAGE_IO_ERROR"
        );
        assert_eq!(
            StorageErrorCode::RecordNotFound.code(),
            "NOTEBOARD_RECORD_NOT_FOUND"
        );
        assert_eq!(
            StorageErrorCode::DataCorruption.code(),
            "NOTEBOARD_DATA_CORRUPTION"
        );
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(StorageError::data_corruption("bad frame").is_fatal());
        assert!(!StorageError::unavailable("closed").is_fatal());
        assert!(!StorageError::not_found("abc").is_fatal());
        assert!(!StorageError::io_error("disk full", io::Error::other("disk full")).is_fatal());
    }

    #[test]
    fn test_display_contains_context() {
        let err = StorageError::corruption_at_offset(1024, "checksum mismatch");
        let display = err.to_string();
        assert!(display.contains("NOTEBOARD_DATA_CORRUPTION"));
        assert!(display.contains("FATAL"));
        assert!(display.contains("checksum mismatch"));
        assert!(display.contains("byte_offset: 1024"));
    }

    #[test]
    fn test_not_found_carries_id() {
        let err = StorageError::not_found("rec-1");
        assert!(err.is_not_found());
        assert_eq!(err.details(), Some("id: rec-1"));
    }
}
