//! Authoritative capture store, owned and mutated only by the interceptor.

use std::collections::HashMap;

use crate::model::{CaptureRecord, ContentId};

/// Mapping of content id to capture record; last write wins, a later capture
/// fully replaces the earlier one. Lives only as long as its realm.
#[derive(Debug, Default)]
pub struct CaptureStore {
    records: HashMap<ContentId, CaptureRecord>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CaptureRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&CaptureRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Owned copy of every record, for the full-dump bridge message.
    pub fn snapshot(&self) -> HashMap<ContentId, CaptureRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
