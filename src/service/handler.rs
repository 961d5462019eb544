//! # Record Service
//!
//! Validates requests, runs them against the injected `RecordStore` and
//! maps results into response payloads. Holds no per-request state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};
use uuid::Uuid;

use crate::storage::{Record, RecordStore, StorageResult};

use super::errors::{ServiceError, ServiceResult};
use super::pagination::{total_pages, PageRequest};
use super::response::{DeleteConfirmation, RecordInput, RecordList};

/// Default bound on a single store call
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Stateless CRUD orchestration over a `RecordStore`.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORAGE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// The injected store (used by the server to close it on shutdown)
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn create_record(&self, input: RecordInput) -> ServiceResult<Record> {
        let (title, description) = validate(input)?;
        self.run("insert", move |store| store.insert(&title, &description))
            .await
    }

    pub async fn list_records(&self, request: PageRequest) -> ServiceResult<RecordList> {
        let offset = request.offset();
        let limit = request.limit();
        let page = self
            .run("scan", move |store| store.scan(offset, limit))
            .await?;

        Ok(RecordList {
            total_pages: total_pages(page.total_count, limit),
            current_page: request.page(),
            total_count: page.total_count,
            records: page.records,
        })
    }

    pub async fn get_record(&self, id: &str) -> ServiceResult<Record> {
        let id = parse_id(id)?;
        self.run("get", move |store| store.get(&id)).await
    }

    /// Title is validated before the lookup, so an invalid body for a
    /// missing record reports the validation error.
    pub async fn update_record(&self, id: &str, input: RecordInput) -> ServiceResult<Record> {
        let (title, description) = validate(input)?;
        let id = parse_id(id)?;
        self.run("update", move |store| {
            store.update(&id, &title, &description)
        })
        .await
    }

    pub async fn delete_record(&self, id: &str) -> ServiceResult<DeleteConfirmation> {
        let id = parse_id(id)?;
        self.run("delete", move |store| store.delete(&id)).await?;
        Ok(DeleteConfirmation::new(id))
    }

    /// Runs one store call on the blocking pool, bounded by the timeout.
    ///
    /// If the caller is dropped while waiting, the call still completes on
    /// the blocking pool and its result is discarded.
    async fn run<T, F>(&self, op: &'static str, f: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore) -> StorageResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || f(store.as_ref()));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => {
                if !err.is_not_found() {
                    error!(op, error = %err, "storage call failed");
                }
                Err(err.into())
            }
            Ok(Err(join_err)) => {
                error!(op, error = %join_err, "storage task aborted");
                Err(ServiceError::StorageUnavailable(format!(
                    "storage task aborted: {}",
                    join_err
                )))
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(op, timeout_ms, "storage call timed out");
                Err(ServiceError::StorageUnavailable(format!(
                    "{} timed out after {}ms",
                    op, timeout_ms
                )))
            }
        }
    }
}

/// Rejects a missing or blank title. Description defaults to empty.
fn validate(input: RecordInput) -> ServiceResult<(String, String)> {
    let title = input.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(ServiceError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok((title, input.description.unwrap_or_default()))
}

/// An id that is not a UUID cannot name any record.
fn parse_id(id: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ServiceError::NotFound)
}
