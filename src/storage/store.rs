//! The storage seam consumed by the record service.

use serde::Serialize;
use uuid::Uuid;

use super::errors::StorageResult;
use super::record::Record;

/// One window of an ordered scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanPage {
    /// Records in `createdAt` descending order (ties: id descending)
    pub records: Vec<Record>,
    /// Size of the whole collection at the time of the scan
    pub total_count: usize,
}

/// Durable CRUD and ordered scan over the record collection.
///
/// Implementations must be safe for concurrent use from many request
/// handlers. Every call is a single atomic operation against the backing
/// store; there is no multi-record transaction.
pub trait RecordStore: Send + Sync {
    /// Persists a new record with a fresh id and the current timestamp.
    fn insert(&self, title: &str, description: &str) -> StorageResult<Record>;

    /// Exact lookup by id.
    fn get(&self, id: &Uuid) -> StorageResult<Record>;

    /// Replaces title and description, keeping id and `created_at`.
    fn update(&self, id: &Uuid, title: &str, description: &str) -> StorageResult<Record>;

    /// Removes a record permanently.
    fn delete(&self, id: &Uuid) -> StorageResult<()>;

    /// Returns up to `limit` records newest-first after skipping `offset`,
    /// together with the total number of records.
    fn scan(&self, offset: usize, limit: usize) -> StorageResult<ScanPage>;

    /// Number of live records.
    fn count(&self) -> StorageResult<usize>;

    /// Flushes and releases the backing store. Calls after `close` fail
    /// with `NOTEBOARD_STORAGE_UNAVAILABLE`.
    fn close(&self) -> StorageResult<()>;
}
