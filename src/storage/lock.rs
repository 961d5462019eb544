//! Exclusive ownership of a data directory
//!
//! Only one process may hold `<data_dir>/data/LOCK` at a time. The lock is
//! an OS advisory lock tied to the open file, so it is released when the
//! guard is dropped or the process dies.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::errors::{StorageError, StorageResult};

const LOCK_FILE: &str = "LOCK";

/// Returns the lock file path for a data directory.
pub fn lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(LOCK_FILE)
}

/// Held for as long as a store owns the data directory.
#[derive(Debug)]
pub struct DataDirLock {
    path: PathBuf,
    _file: File,
}

impl DataDirLock {
    /// Takes the lock without blocking.
    ///
    /// Fails with `NOTEBOARD_STORAGE_LOCKED` if another handle holds it.
    pub fn acquire(data_dir: &Path) -> StorageResult<Self> {
        let path = lock_path(data_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::io_error(
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                StorageError::io_error(format!("Failed to open lock file: {}", path.display()), e)
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::locked(path.display()));
        }

        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
