//! Append-only log writer with fsync enforcement
//!
//! A mutation is acknowledged only after its entry has been written and
//! the file synced. Entries are never modified in place.
//!
//! A failed write or fsync is rolled back by truncating the file to the
//! last acknowledged offset. If that truncation also fails the writer is
//! poisoned and refuses every later append, so nothing is ever written
//! after a torn frame.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use super::errors::{StorageError, StorageResult};
use super::record::LogEntry;

/// Appends entries to `records.log`.
pub struct LogWriter {
    log_path: PathBuf,
    file: File,
    /// End of the last acknowledged entry
    current_offset: u64,
    poisoned: bool,
}

impl LogWriter {
    /// Opens or creates the log file at `log_path`, creating parent
    /// directories if needed. Writes continue at the end of the file.
    pub fn open(log_path: &Path) -> StorageResult<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::io_error(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| {
                StorageError::io_error(
                    format!("Failed to open record log: {}", log_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
            .len();

        Ok(Self {
            log_path: log_path.to_path_buf(),
            file,
            current_offset,
            poisoned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Returns the current end-of-log offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Appends one entry and fsyncs.
    ///
    /// Returns the byte offset where the entry starts.
    pub fn append(&mut self, entry: &LogEntry) -> StorageResult<u64> {
        let offset = self.current_offset;
        self.write_durable(&entry.serialize(), &format!("entry for {}", entry.id()))?;
        Ok(offset)
    }

    /// Appends several entries with a single write and fsync.
    pub fn append_batch(&mut self, entries: &[LogEntry]) -> StorageResult<()> {
        let buf: Vec<u8> = entries.iter().flat_map(|e| e.serialize()).collect();
        self.write_durable(&buf, "entry batch")
    }

    /// Syncs any buffered state to disk.
    pub fn sync(&mut self) -> StorageResult<()> {
        self.file
            .sync_all()
            .map_err(|e| StorageError::io_error("fsync failed on record log", e))
    }

    /// Renames the underlying file. The open handle keeps pointing at the
    /// same file, so appends continue under the new name.
    pub fn rename_to(&mut self, new_path: &Path) -> StorageResult<()> {
        fs::rename(&self.log_path, new_path).map_err(|e| {
            StorageError::io_error(
                format!("Failed to rename log to {}", new_path.display()),
                e,
            )
        })?;
        self.log_path = new_path.to_path_buf();
        Ok(())
    }

    /// Truncates the file back to the last acknowledged offset, dropping
    /// any bytes of an entry that was never acknowledged.
    pub fn discard_unacknowledged(&mut self) -> StorageResult<()> {
        let result = self
            .file
            .set_len(self.current_offset)
            .and_then(|()| self.file.sync_all());

        if let Err(e) = result {
            self.poisoned = true;
            return Err(StorageError::io_error(
                format!(
                    "Failed to truncate record log to offset {}",
                    self.current_offset
                ),
                e,
            ));
        }
        Ok(())
    }

    fn write_durable(&mut self, buf: &[u8], what: &str) -> StorageResult<()> {
        self.ensure_writable()?;

        let result = self
            .file
            .write_all(buf)
            .map_err(|e| StorageError::io_error(format!("Failed to append {}", what), e))
            .and_then(|()| {
                self.file
                    .sync_all()
                    .map_err(|e| StorageError::io_error(format!("fsync failed after {}", what), e))
            });

        match result {
            Ok(()) => {
                self.current_offset += buf.len() as u64;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback) = self.discard_unacknowledged() {
                    error!(
                        path = %self.log_path.display(),
                        error = %rollback,
                        "record log rollback failed, writer poisoned"
                    );
                }
                Err(err)
            }
        }
    }

    /// Refuses to append after an unrecoverable failure and trims any
    /// leftover tail so the next entry starts on a frame boundary.
    fn ensure_writable(&mut self) -> StorageResult<()> {
        if self.poisoned {
            return Err(StorageError::unavailable(format!(
                "Record log {} is unusable after a failed write",
                self.log_path.display()
            )));
        }

        let on_disk = self
            .file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
            .len();

        if on_disk > self.current_offset {
            warn!(
                path = %self.log_path.display(),
                acknowledged = self.current_offset,
                on_disk,
                "discarding unacknowledged log tail"
            );
            self.discard_unacknowledged()?;
        } else if on_disk < self.current_offset {
            self.poisoned = true;
            return Err(StorageError::unavailable(format!(
                "Record log {} shrank below acknowledged offset {}",
                self.log_path.display(),
                self.current_offset
            )));
        }

        Ok(())
    }
}
