//! Process-lifetime memory table

use dashmap::DashMap;
use std::sync::Arc;

/// In-memory table of decompressed XML, keyed by file
///
/// Entries live until the table is dropped or cleared; there is no eviction.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<str>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file: &str) -> Option<Arc<str>> {
        self.entries.get(file).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, file: &str) -> bool {
        self.entries.contains_key(file)
    }

    /// Insert or overwrite; content is immutable per key so overwrites are equivalent
    pub fn insert(&self, file: impl Into<String>, xml: Arc<str>) {
        self.entries.insert(file.into(), xml);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
