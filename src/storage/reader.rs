//! Sequential log reader with strict corruption detection
//!
//! Every entry is checksum-verified as it is read. A truncated tail or a
//! checksum mismatch is reported with the byte offset of the bad entry.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{LogEntry, MIN_ENTRY_SIZE};

/// Reader for replaying a record log from the start.
pub struct LogReader {
    log_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl LogReader {
    /// Opens the log file for reading.
    pub fn open(log_path: &Path) -> StorageResult<Self> {
        let file = File::open(log_path).map_err(|e| {
            StorageError::io_error(
                format!("Failed to open record log: {}", log_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
            .len();

        Ok(Self {
            log_path: log_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Returns the offset of the next entry to be read.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` if an entry was read
    /// - `Ok(None)` at end of file
    /// - `Err(NOTEBOARD_DATA_CORRUPTION)` on a bad frame or checksum
    pub fn read_next(&mut self) -> StorageResult<Option<LogEntry>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;

        if remaining < MIN_ENTRY_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated log: {} bytes remaining, minimum entry size is {}",
                    remaining, MIN_ENTRY_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read entry length: {}", e),
            )
        })?;
        let entry_length = u32::from_le_bytes(len_buf) as u64;

        if entry_length < MIN_ENTRY_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid entry length: {}", entry_length),
            ));
        }

        if entry_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Entry length {} exceeds remaining file size {}",
                    entry_length, remaining
                ),
            ));
        }

        let mut entry_buf = vec![0u8; entry_length as usize];
        entry_buf[0..4].copy_from_slice(&len_buf);

        self.reader.read_exact(&mut entry_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read entry body: {}", e),
            )
        })?;

        let (entry, consumed) = LogEntry::deserialize(&entry_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;

        Ok(Some(entry))
    }

    /// Reads all remaining entries. Any corruption fails the whole read.
    pub fn read_all(&mut self) -> StorageResult<Vec<LogEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read_next()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
