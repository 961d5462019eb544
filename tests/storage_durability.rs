//! Storage Durability Tests
//!
//! - Acknowledged writes survive reopen
//! - Corruption is never ignored: a flipped byte or a torn tail fails open
//! - Compaction keeps live records and shrinks the log
//! - Verify is read-only
//! - A failed append never strands later acknowledged writes
//! - One store owns a data directory at a time

use std::fs::{self, OpenOptions};
use std::io::Write;

use noteboard::storage::{log_path, FileStore, RecordStore, StorageErrorCode};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn flip_byte(data_dir: &TempDir, offset: usize) {
    let path = log_path(data_dir.path());
    let mut bytes = fs::read(&path).unwrap();
    bytes[offset] ^= 0xFF;
    fs::write(&path, bytes).unwrap();
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let temp_dir = create_temp_data_dir();

    let (kept, edited) = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let kept = store.insert("Keep", "unchanged").unwrap();
        let edited = store.insert("Edit", "before").unwrap();
        let gone = store.insert("Gone", "").unwrap();
        let edited = store.update(&edited.id, "Edited", "after").unwrap();
        store.delete(&gone.id).unwrap();
        store.close().unwrap();
        (kept, edited)
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.get(&kept.id).unwrap(), kept);
    assert_eq!(store.get(&edited.id).unwrap(), edited);

    let scan = store.scan(0, 10).unwrap();
    assert_eq!(scan.total_count, 2);
    assert_eq!(scan.records[0].id, edited.id);
    assert_eq!(scan.records[1].id, kept.id);
}

#[test]
fn test_reopen_without_close() {
    let temp_dir = create_temp_data_dir();

    let record = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert("Unclean", "no close").unwrap()
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.get(&record.id).unwrap(), record);
}

// =============================================================================
// Corruption Is Never Ignored
// =============================================================================

#[test]
fn test_flipped_byte_fails_open() {
    let temp_dir = create_temp_data_dir();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert("Victim", "payload").unwrap();
        store.close().unwrap();
    }

    // Inside the title bytes of the first entry
    flip_byte(&temp_dir, 4 + 1 + 16 + 8 + 4);

    let err = match FileStore::open(temp_dir.path()) {
        Ok(_) => panic!("open must fail on a corrupted log"),
        Err(e) => e,
    };
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
    assert!(err.is_fatal());
    assert!(err.to_string().to_lowercase().contains("checksum"));
}

#[test]
fn test_torn_tail_fails_open() {
    let temp_dir = create_temp_data_dir();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert("Complete", "").unwrap();
        store.close().unwrap();
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(log_path(temp_dir.path()))
        .unwrap();
    file.write_all(&[0x2A, 0x00, 0x00]).unwrap();
    file.sync_all().unwrap();

    let err = FileStore::verify(temp_dir.path()).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
    assert!(FileStore::open(temp_dir.path()).is_err());
}

#[test]
fn test_writes_after_torn_append_survive_reopen() {
    let temp_dir = create_temp_data_dir();

    let (first, second) = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let first = store.insert("before", "").unwrap();

        // Partial frame left behind by an append that failed midway
        let mut file = OpenOptions::new()
            .append(true)
            .open(log_path(temp_dir.path()))
            .unwrap();
        file.write_all(&[0x40, 0x00, 0x00, 0x00, 0x01]).unwrap();
        file.sync_all().unwrap();

        let second = store.insert("after", "").unwrap();
        store.close().unwrap();
        (first, second)
    };

    let report = FileStore::verify(temp_dir.path()).unwrap();
    assert_eq!(report.entries, 2);

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.get(&first.id).unwrap(), first);
    assert_eq!(store.get(&second.id).unwrap(), second);
}

// =============================================================================
// Exclusive Ownership
// =============================================================================

#[test]
fn test_second_open_fails_while_first_is_live() {
    let temp_dir = create_temp_data_dir();
    let store = FileStore::open(temp_dir.path()).unwrap();
    store.insert("owned", "").unwrap();

    let err = match FileStore::open(temp_dir.path()) {
        Ok(_) => panic!("data directory must not be opened twice"),
        Err(e) => e,
    };
    assert_eq!(err.code(), StorageErrorCode::StorageLocked);

    drop(store);
    let reopened = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(reopened.count().unwrap(), 1);
}

// =============================================================================
// Compaction
// =============================================================================

#[test]
fn test_compaction_preserves_live_records() {
    let temp_dir = create_temp_data_dir();
    let store = FileStore::open(temp_dir.path()).unwrap();

    let mut live = Vec::new();
    for i in 0..5 {
        let record = store.insert(&format!("note {}", i), "").unwrap();
        let record = store.update(&record.id, &format!("note {} v2", i), "edited").unwrap();
        live.push(record);
    }
    for i in 0..3 {
        let record = store.insert(&format!("temp {}", i), "").unwrap();
        store.delete(&record.id).unwrap();
    }

    let report = store.compact().unwrap();
    assert_eq!(report.entries_before, 16);
    assert_eq!(report.entries_after, 5);
    assert!(report.bytes_after < report.bytes_before);

    // The store keeps accepting writes after compaction
    let late = store.insert("after compaction", "").unwrap();
    store.close().unwrap();

    let reopened = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(reopened.count().unwrap(), 6);
    for record in &live {
        assert_eq!(&reopened.get(&record.id).unwrap(), record);
    }
    assert_eq!(reopened.get(&late.id).unwrap(), late);
    reopened.close().unwrap();

    let verify = FileStore::verify(temp_dir.path()).unwrap();
    assert_eq!(verify.entries, 6);
    assert_eq!(verify.live_records, 6);
}

// =============================================================================
// Verify
// =============================================================================

#[test]
fn test_verify_does_not_modify_log() {
    let temp_dir = create_temp_data_dir();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let record = store.insert("a", "").unwrap();
        store.insert("b", "").unwrap();
        store.delete(&record.id).unwrap();
        store.close().unwrap();
    }

    let before = fs::read(log_path(temp_dir.path())).unwrap();
    let report = FileStore::verify(temp_dir.path()).unwrap();
    let after = fs::read(log_path(temp_dir.path())).unwrap();

    assert_eq!(before, after);
    assert_eq!(report.entries, 3);
    assert_eq!(report.live_records, 1);
    assert_eq!(report.bytes, before.len() as u64);
}
