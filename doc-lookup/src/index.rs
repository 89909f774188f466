//! Insertion-ordered identifier → URL mapping.

use std::collections::HashMap;

/// One `(identifier, url)` pair extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub url: String,
}

/// Mapping that remembers first-insertion order.
///
/// Re-inserting an existing key replaces its URL but keeps its position,
/// so the last write wins while iteration order stays reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocIndex {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
}

impl DocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
        let key = key.into();
        let url = url.into();
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].url = url,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push(IndexEntry { key, url });
            }
        }
    }

    /// Merges `other` into `self` in `other`'s order.
    pub fn extend(&mut self, other: DocIndex) {
        for IndexEntry { key, url } in other.entries {
            self.insert(key, url);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].url.as_str())
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
