//! In-memory record index shared by both store implementations
//!
//! Lookups go through a hash map; scans walk a B-tree keyed by
//! `(Reverse(created_at), Reverse(id))`, which yields newest-first order
//! with a deterministic tie-break on id.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::record::{LogEntry, Record};

type OrderKey = (Reverse<DateTime<Utc>>, Reverse<Uuid>);

fn order_key(record: &Record) -> OrderKey {
    (Reverse(record.created_at), Reverse(record.id))
}

/// Live records plus their scan order.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: HashMap<Uuid, Record>,
    order: BTreeSet<OrderKey>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.records.contains_key(id)
    }

    /// Inserts or replaces a record.
    pub fn put(&mut self, record: Record) {
        if let Some(previous) = self.records.get(&record.id) {
            self.order.remove(&order_key(previous));
        }
        self.order.insert(order_key(&record));
        self.records.insert(record.id, record);
    }

    /// Removes a record, returning it if it was live.
    pub fn remove(&mut self, id: &Uuid) -> Option<Record> {
        let removed = self.records.remove(id)?;
        self.order.remove(&order_key(&removed));
        Some(removed)
    }

    /// Applies a replayed log entry.
    pub fn apply(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::Put(record) => self.put(record),
            LogEntry::Delete(id) => {
                self.remove(&id);
            }
        }
    }

    /// Returns up to `limit` records newest-first, skipping `offset`.
    pub fn scan(&self, offset: usize, limit: usize) -> Vec<Record> {
        self.iter_ordered().skip(offset).take(limit).cloned().collect()
    }

    /// Iterates all live records newest-first.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Record> + '_ {
        self.order
            .iter()
            .filter_map(|(_, Reverse(id))| self.records.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_at(title: &str, base: DateTime<Utc>, offset_secs: i64) -> Record {
        Record {
            created_at: base + Duration::seconds(offset_secs),
            ..Record::new(title, "")
        }
    }

    #[test]
    fn test_scan_is_newest_first() {
        let base = Utc::now();
        let mut index = RecordIndex::new();
        index.put(record_at("old", base, 0));
        index.put(record_at("new", base, 20));
        index.put(record_at("mid", base, 10));

        let titles: Vec<_> = index.scan(0, 10).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let created_at = Utc::now();
        let mut index = RecordIndex::new();
        for i in 0..5 {
            index.put(Record {
                created_at,
                ..Record::new(format!("r{}", i), "")
            });
        }

        let ids: Vec<_> = index.scan(0, 5).into_iter().map(|r| r.id).collect();
        let mut expected = ids.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected);
        assert_eq!(index.scan(0, 5), index.scan(0, 5));
    }

    #[test]
    fn test_put_replaces_without_duplicating_order() {
        let mut index = RecordIndex::new();
        let record = Record::new("before", "");
        index.put(record.clone());
        index.put(Record {
            title: "after".to_string(),
            ..record.clone()
        });

        assert_eq!(index.len(), 1);
        assert_eq!(index.scan(0, 10).len(), 1);
        assert_eq!(index.get(&record.id).unwrap().title, "after");
    }

    #[test]
    fn test_apply_delete() {
        let mut index = RecordIndex::new();
        let record = Record::new("gone", "");
        index.apply(LogEntry::Put(record.clone()));
        index.apply(LogEntry::Delete(record.id));

        assert!(index.is_empty());
        assert!(index.scan(0, 10).is_empty());
    }

    #[test]
    fn test_scan_window() {
        let base = Utc::now();
        let mut index = RecordIndex::new();
        for i in 0..11 {
            index.put(record_at(&format!("r{}", i), base, i));
        }

        assert_eq!(index.scan(0, 10).len(), 10);
        let tail = index.scan(10, 10);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].title, "r0");
        assert!(index.scan(50, 10).is_empty());
    }
}
