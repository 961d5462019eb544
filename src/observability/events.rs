//! Lifecycle events
//!
//! Events are explicit and typed. They are emitted as the `event` field of
//! a tracing record so log consumers can filter on a stable name.

use std::fmt;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Record store opened
    StorageOpened,
    /// HTTP listener bound, ready to serve
    ServerListening,
    /// Shutdown signal received
    ShutdownStart,
    /// Record store flushed and closed
    StorageClosed,
    /// Shutdown complete
    ShutdownComplete,

    // Storage maintenance
    /// Record log replayed into memory
    LogReplayed,
    /// Record log rewritten without superseded entries
    CompactionComplete,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StorageOpened => "STORAGE_OPENED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::StorageClosed => "STORAGE_CLOSED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::LogReplayed => "LOG_REPLAYED",
            Event::CompactionComplete => "COMPACTION_COMPLETE",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
