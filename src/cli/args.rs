//! CLI argument definitions using clap
//!
//! Commands:
//! - noteboard init [--config <path>]
//! - noteboard serve [--config <path>] [--port <port>]
//! - noteboard verify [--config <path>]
//! - noteboard compact [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Noteboard - a durable record service for notes and todos
#[derive(Parser, Debug)]
#[command(name = "noteboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty record log
    Init {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the config file and $PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check every entry of the record log and print a summary
    Verify {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rewrite the record log without superseded entries
    Compact {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["noteboard", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert!(config.is_none());
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_verify_with_config() {
        let cli =
            Cli::try_parse_from(["noteboard", "verify", "--config", "/etc/noteboard.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Verify { config: Some(path) } if path == PathBuf::from("/etc/noteboard.json")
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["noteboard", "explode"]).is_err());
    }
}
