//! In-memory keyed record collection.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::store::record::FeedRecord;

/// A set of feed records keyed by id.
///
/// Keys are unique; iteration order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: HashMap<String, FeedRecord>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&FeedRecord> {
        self.records.get(id)
    }

    /// Whether a record with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Insert a record, replacing any record with the same id.
    ///
    /// Returns the replaced record.
    pub fn insert(&mut self, record: FeedRecord) -> Option<FeedRecord> {
        self.records.insert(record.id.clone(), record)
    }

    /// Insert a record only if its id is not present yet.
    ///
    /// Returns `true` if the record was inserted.
    pub fn insert_new(&mut self, record: FeedRecord) -> bool {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Keep only the records for which `keep` returns true.
    ///
    /// Returns the removed records.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<FeedRecord>
    where
        F: FnMut(&FeedRecord) -> bool,
    {
        let mut removed = Vec::new();
        self.records.retain(|_, record| {
            if keep(record) {
                true
            } else {
                removed.push(record.clone());
                false
            }
        });
        removed
    }

    /// Iterate over the records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &FeedRecord> {
        self.records.values()
    }

    /// Records ordered by id.
    pub fn sorted(&self) -> Vec<&FeedRecord> {
        let mut records: Vec<&FeedRecord> = self.records.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

impl FromIterator<FeedRecord> for RecordStore {
    /// Later records replace earlier ones with the same id.
    fn from_iter<I: IntoIterator<Item = FeedRecord>>(iter: I) -> Self {
        let mut store = RecordStore::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}
