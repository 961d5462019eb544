//! Durable record store backed by an append-only log
//!
//! Layout: `<data_dir>/data/records.log`.
//!
//! On open the data directory lock is taken and the whole log is replayed
//! into a `RecordIndex`; any corrupt entry aborts the open. Each mutation appends one entry and fsyncs
//! before the in-memory index changes, so the index never holds state
//! the log does not.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::index::RecordIndex;
use super::lock::DataDirLock;
use super::reader::LogReader;
use super::record::{LogEntry, Record};
use super::store::{RecordStore, ScanPage};
use super::writer::LogWriter;
use crate::observability::Event;

const LOG_FILE: &str = "records.log";
const COMPACT_FILE: &str = "records.log.compact";

/// Returns the log path for a data directory.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(LOG_FILE)
}

/// Result of a read-only integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub entries: usize,
    pub live_records: usize,
    pub bytes: u64,
}

/// Result of a log compaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    pub entries_before: usize,
    pub entries_after: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

struct FileState {
    index: RecordIndex,
    /// `None` once the store has been closed
    writer: Option<LogWriter>,
    entry_count: usize,
    /// Released on close so another process can take over
    lock: Option<DataDirLock>,
}

/// `RecordStore` persisted to an append-only, checksummed log.
pub struct FileStore {
    log_path: PathBuf,
    state: RwLock<FileState>,
}

impl FileStore {
    /// Opens (or creates) the store under `data_dir` and replays its log.
    ///
    /// Fails with `NOTEBOARD_STORAGE_LOCKED` while another store holds the
    /// directory.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let lock = DataDirLock::acquire(data_dir)?;
        let log_path = log_path(data_dir);

        let (index, entry_count) = if log_path.exists() {
            replay(&log_path)?
        } else {
            (RecordIndex::new(), 0)
        };

        let writer = LogWriter::open(&log_path)?;

        info!(
            event = %Event::LogReplayed,
            entries = entry_count,
            live_records = index.len(),
            path = %log_path.display()
        );

        Ok(Self {
            log_path,
            state: RwLock::new(FileState {
                index,
                writer: Some(writer),
                entry_count,
                lock: Some(lock),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Checks every entry of the log under `data_dir` without opening it
    /// for writing. Holds the directory lock so a live writer cannot race
    /// the scan.
    pub fn verify(data_dir: &Path) -> StorageResult<VerifyReport> {
        let _lock = DataDirLock::acquire(data_dir)?;
        let log_path = log_path(data_dir);
        let (index, entries) = replay(&log_path)?;
        let bytes = fs::metadata(&log_path)
            .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
            .len();

        Ok(VerifyReport {
            entries,
            live_records: index.len(),
            bytes,
        })
    }

    /// Rewrites the log with one put entry per live record.
    ///
    /// The new log is written and synced to a side file, then renamed over
    /// the old one. Writers are blocked for the duration.
    pub fn compact(&self) -> StorageResult<CompactionReport> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))?;
        let bytes_before = match state.writer.as_ref() {
            Some(writer) => writer.current_offset(),
            None => return Err(StorageError::unavailable("Store is closed")),
        };
        let entries_before = state.entry_count;

        let compact_path = self.log_path.with_file_name(COMPACT_FILE);
        if compact_path.exists() {
            fs::remove_file(&compact_path).map_err(|e| {
                StorageError::io_error("Failed to remove stale compaction file", e)
            })?;
        }

        let live: Vec<LogEntry> = state
            .index
            .iter_ordered()
            .cloned()
            .map(LogEntry::Put)
            .collect();

        // The side file's writer becomes the live writer once renamed
        let mut compact_writer = LogWriter::open(&compact_path)?;
        let staged = compact_writer
            .append_batch(&live)
            .and_then(|()| compact_writer.rename_to(&self.log_path));
        if let Err(e) = staged {
            drop(compact_writer);
            if let Err(cleanup) = fs::remove_file(&compact_path) {
                debug!(error = %cleanup, "compaction side file not removed");
            }
            return Err(e);
        }
        let bytes_after = compact_writer.current_offset();

        // The old handle points at the replaced file
        drop(state.writer.replace(compact_writer));
        state.entry_count = live.len();

        sync_parent_dir(&self.log_path)?;

        let report = CompactionReport {
            entries_before,
            entries_after: live.len(),
            bytes_before,
            bytes_after,
        };

        info!(
            event = %Event::CompactionComplete,
            bytes_before,
            bytes_after,
            entries_after = report.entries_after
        );

        Ok(report)
    }

    fn read<T>(&self, f: impl FnOnce(&RecordIndex) -> StorageResult<T>) -> StorageResult<T> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))?;
        if state.writer.is_none() {
            return Err(StorageError::unavailable("Store is closed"));
        }
        f(&state.index)
    }

    /// Appends `entry` and, once it is durable, applies it to the index.
    fn commit(state: &mut FileState, entry: LogEntry) -> StorageResult<()> {
        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| StorageError::unavailable("Store is closed"))?;
        let offset = writer.append(&entry)?;
        debug!(id = %entry.id(), offset, "log entry appended");

        state.entry_count += 1;
        state.index.apply(entry);
        Ok(())
    }

    fn write_state(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, FileState>> {
        self.state
            .write()
            .map_err(|_| StorageError::unavailable("Lock poisoned"))
    }
}

impl RecordStore for FileStore {
    fn insert(&self, title: &str, description: &str) -> StorageResult<Record> {
        let record = Record::new(title, description);
        let mut state = self.write_state()?;
        Self::commit(&mut state, LogEntry::Put(record.clone()))?;
        Ok(record)
    }

    fn get(&self, id: &Uuid) -> StorageResult<Record> {
        self.read(|index| index.get(id).cloned().ok_or_else(|| StorageError::not_found(id)))
    }

    fn update(&self, id: &Uuid, title: &str, description: &str) -> StorageResult<Record> {
        let mut state = self.write_state()?;
        if state.writer.is_none() {
            return Err(StorageError::unavailable("Store is closed"));
        }
        let existing = state
            .index
            .get(id)
            .ok_or_else(|| StorageError::not_found(id))?;
        let updated = Record {
            title: title.to_string(),
            description: description.to_string(),
            ..existing.clone()
        };
        Self::commit(&mut state, LogEntry::Put(updated.clone()))?;
        Ok(updated)
    }

    fn delete(&self, id: &Uuid) -> StorageResult<()> {
        let mut state = self.write_state()?;
        if state.writer.is_none() {
            return Err(StorageError::unavailable("Store is closed"));
        }
        if !state.index.contains(id) {
            return Err(StorageError::not_found(id));
        }
        Self::commit(&mut state, LogEntry::Delete(*id))
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
        let mut state = self.write_state()?;
        if let Some(mut writer) = state.writer.take() {
            writer.sync()?;
            info!(path = %writer.path().display(), "record log closed");
        }
        state.lock = None;
        Ok(())
    }
}

/// Replays the log at `log_path`, returning the live index and the number
/// of entries read.
fn replay(log_path: &Path) -> StorageResult<(RecordIndex, usize)> {
    let mut reader = LogReader::open(log_path)?;
    let mut index = RecordIndex::new();
    let mut entries = 0;

    while let Some(entry) = reader.read_next()? {
        index.apply(entry);
        entries += 1;
    }

    Ok((index, entries))
}

fn sync_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| StorageError::io_error("Failed to sync data directory", e))?;
    }
    Ok(())
}
