//! Record type and on-disk log entry format
//!
//! The log is a sequence of entries:
//!
//! ```text
//! +-------------------+
//! | Entry Length      | (u32 LE, includes itself and the checksum)
//! +-------------------+
//! | Kind              | (u8: 1 = put, 2 = delete)
//! +-------------------+
//! | Record ID         | (16 bytes, UUID)
//! +-------------------+
//! | Created At        | (i64 LE, microseconds since epoch)
//! +-------------------+
//! | Title             | (length-prefixed UTF-8)
//! +-------------------+
//! | Description       | (length-prefixed UTF-8)
//! +-------------------+
//! | Checksum          | (u32 LE)
//! +-------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself. Delete entries
//! carry empty strings and a zero timestamp.

use std::io::{self, Read};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checksum::compute_checksum;

/// Smallest possible entry: length + kind + id + timestamp + two empty
/// strings + checksum.
pub const MIN_ENTRY_SIZE: usize = 4 + 1 + 16 + 8 + 4 + 4 + 4;

const KIND_PUT: u8 = 1;
const KIND_DELETE: u8 = 2;

/// A single persisted note/todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Creates a record with a fresh id stamped with the current instant.
    ///
    /// The timestamp is truncated to microseconds so that it survives a
    /// round trip through the log unchanged.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// One mutation as written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Full record state after an insert or update
    Put(Record),
    /// Record removed
    Delete(Uuid),
}

impl LogEntry {
    /// Returns the id of the record this entry mutates
    pub fn id(&self) -> Uuid {
        match self {
            LogEntry::Put(record) => record.id,
            LogEntry::Delete(id) => *id,
        }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let (kind, id, created_at, title, description) = match self {
            LogEntry::Put(r) => (
                KIND_PUT,
                r.id,
                r.created_at.timestamp_micros(),
                r.title.as_str(),
                r.description.as_str(),
            ),
            LogEntry::Delete(id) => (KIND_DELETE, *id, 0, "", ""),
        };

        let mut buf = Vec::with_capacity(1 + 16 + 8 + 8 + title.len() + description.len());
        buf.push(kind);
        buf.extend_from_slice(id.as_bytes());
        buf.extend_from_slice(&created_at.to_le_bytes());

        buf.extend_from_slice(&(title.len() as u32).to_le_bytes());
        buf.extend_from_slice(title.as_bytes());

        buf.extend_from_slice(&(description.len() as u32).to_le_bytes());
        buf.extend_from_slice(description.as_bytes());

        buf
    }

    /// Serialize the complete entry, including length prefix and checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let entry_length = (4 + body.len() + 4) as u32;

        let mut entry = Vec::with_capacity(entry_length as usize);
        entry.extend_from_slice(&entry_length.to_le_bytes());
        entry.extend_from_slice(&body);

        let checksum = compute_checksum(&entry);
        entry.extend_from_slice(&checksum.to_le_bytes());

        entry
    }

    /// Deserialize an entry from bytes, verifying its checksum.
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_ENTRY_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Entry too short",
            ));
        }

        let entry_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if entry_length < MIN_ENTRY_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid entry length: {}", entry_length),
            ));
        }

        if data.len() < entry_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Entry truncated: expected {} bytes, got {}",
                    entry_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = entry_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let mut kind = [0u8; 1];
        cursor.read_exact(&mut kind)?;

        let mut id_buf = [0u8; 16];
        cursor.read_exact(&mut id_buf)?;
        let id = Uuid::from_bytes(id_buf);

        let mut ts_buf = [0u8; 8];
        cursor.read_exact(&mut ts_buf)?;
        let created_micros = i64::from_le_bytes(ts_buf);

        let title = read_string(&mut cursor)?;
        let description = read_string(&mut cursor)?;

        let entry = match kind[0] {
            KIND_PUT => {
                let created_at = DateTime::from_timestamp_micros(created_micros).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Timestamp out of range: {}", created_micros),
                    )
                })?;
                LogEntry::Put(Record {
                    id,
                    title,
                    description,
                    created_at,
                })
            }
            KIND_DELETE => LogEntry::Delete(id),
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Unknown entry kind: {}", other),
                ))
            }
        };

        Ok((entry, entry_length))
    }
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}
