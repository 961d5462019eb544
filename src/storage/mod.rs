//! Record storage engine
//!
//! Owns the durable collection of records and exposes CRUD plus an ordered,
//! offset-paginated scan through the `RecordStore` trait.
//!
//! # Design Principles
//!
//! - Append-only log, no in-place updates
//! - Checksum-verified on every read
//! - Corruption at open is fatal, never skipped
//! - Mutations are fsynced before they are acknowledged
//! - Scans are newest-first with a deterministic tie-break on id
//! - One process owns a data directory at a time

mod checksum;
mod errors;
mod file;
mod index;
mod lock;
mod memory;
mod reader;
mod record;
mod store;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use file::{log_path, CompactionReport, FileStore, VerifyReport};
pub use index::RecordIndex;
pub use lock::{lock_path, DataDirLock};
pub use memory::MemoryStore;
pub use reader::LogReader;
pub use record::{LogEntry, Record};
pub use store::{RecordStore, ScanPage};
pub use writer::LogWriter;
