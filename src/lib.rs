//! noteboard - a small durable record service for notes and todos
//!
//! Records carry a title, a description and a creation timestamp. They are
//! kept in an append-only checksummed log and served over a JSON HTTP API.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod service;
pub mod storage;
