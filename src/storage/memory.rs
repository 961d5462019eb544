//! Volatile record store

use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::index::RecordIndex;
use super::record::Record;
use super::store::{RecordStore, ScanPage};

#[derive(Debug, Default)]
struct MemoryState {
    index: RecordIndex,
    closed: bool,
}

/// In-memory `RecordStore`. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&RecordIndex) -> StorageResult<T>) -> StorageResult<T> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))?;
        if state.closed {
            return Err(StorageError::unavailable("Store is closed"));
        }
        f(&state.index)
    }

    fn write<T>(&self, f: impl FnOnce(&mut RecordIndex) -> StorageResult<T>) -> StorageResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))?;
        if state.closed {
            return Err(StorageError::unavailable("Store is closed"));
        }
        f(&mut state.index)
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, title: &str, description: &str) -> StorageResult<Record> {
        let record = Record::new(title, description);
        self.write(|index| {
            index.put(record.clone());
            Ok(record)
        })
    }

    fn get(&self, id: &Uuid) -> StorageResult<Record> {
        self.read(|index| index.get(id).cloned().ok_or_else(|| StorageError::not_found(id)))
    }

    fn update(&self, id: &Uuid, title: &str, description: &str) -> StorageResult<Record> {
        self.write(|index| {
            let existing = index.get(id).ok_or_else(|| StorageError::not_found(id))?;
            let updated = Record {
                title: title.to_string(),
                description: description.to_string(),
                ..existing.clone()
            };
            index.put(updated.clone());
            Ok(updated)
        })
    }

    fn delete(&self, id: &Uuid) -> StorageResult<()> {
        self.write(|index| {
            index
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| StorageError::not_found(id))
        })
    }

    fn scan(&self, offset: usize, limit: usize) -> StorageResult<ScanPage> {
        self.read(|index| {
            Ok(ScanPage {
                records: index.scan(offset, limit),
                total_count: index.len(),
            })
        })
    }

    fn count(&self) -> StorageResult<usize> {
        self.read(|index| Ok(index.len()))
    }

    fn close(&self) -> StorageResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))?;
        state.closed = true;
        Ok(())
    }
}
