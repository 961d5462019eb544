//! # HTTP Server Module
//!
//! Axum server exposing the record service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/records` - List (GET) and create (POST)
//! - `/records/:id` - Get (GET), update (PUT), delete (DELETE)

pub mod config;
pub mod observability_routes;
pub mod record_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::{shutdown_signal, HttpServer, ServerError};
