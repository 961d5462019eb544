//! CLI module for Noteboard
//!
//! Provides command-line interface for:
//! - init: Create the data directory and empty record log
//! - serve: Boot the store and serve HTTP
//! - verify: Check record log integrity
//! - compact: Rewrite the record log

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compact, init, run, run_command, serve, verify};
pub use config::{Config, StorageKind, DEFAULT_CONFIG_PATH, PORT_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
