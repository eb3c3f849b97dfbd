//! Key-grouping index: maps each [`IdentityKey`] to the records sharing it,
//! in the order they were encountered.
use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::record::{IdentityKey, KeyEncoding, Record};

/// Records of one source table grouped by identity key. Keys iterate in
/// sorted order; each group keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    groups: BTreeMap<IdentityKey, Vec<Record>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I, encoding: KeyEncoding) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut index = Self::new();
        for r in records {
            index.insert(r, encoding);
        }
        index
    }

    /// Append `record` to the group for its key.
    pub fn insert(&mut self, record: Record, encoding: KeyEncoding) {
        self.groups
            .entry(record.key(encoding))
            .or_default()
            .push(record);
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&[Record]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.groups.contains_key(key)
    }

    pub fn keys(&self) -> btree_map::Keys<'_, IdentityKey, Vec<Record>> {
        self.groups.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, IdentityKey, Vec<Record>> {
        self.groups.iter()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Group `records` by identity key.
pub fn group_by_key(records: &[Record], encoding: KeyEncoding) -> Index {
    Index::from_records(records.iter().cloned(), encoding)
}
