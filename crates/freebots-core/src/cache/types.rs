//! Cache types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Namespace prefix for persistent keys
pub const XML_CACHE_PREFIX: &str = "freebots:xml:";

/// Cache key for one XML file
///
/// The file identifier is used as-is for the memory layer; the persistent
/// layer stores it under [`XML_CACHE_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    file: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    /// The storage key of the file
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Key under which the compressed token is persisted
    pub fn persistent_key(&self) -> String {
        format!("{}{}", XML_CACHE_PREFIX, self.file)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file)
    }
}

/// Layer that answered a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheLayer {
    Memory,
    Persistent,
    Remote,
}

impl fmt::Display for CacheLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Persistent => "disk",
            Self::Remote => "network",
        };
        f.write_str(name)
    }
}

/// Live counters, updated without locking
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    pub memory_hits: AtomicU64,
    pub persistent_hits: AtomicU64,
    pub remote_fetches: AtomicU64,
    pub not_found: AtomicU64,
    pub failures: AtomicU64,
    pub decode_failures: AtomicU64,
}

impl CacheCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, memory_entries: usize) -> CacheStatistics {
        CacheStatistics {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            memory_entries,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Resolutions answered by the memory table
    pub memory_hits: u64,
    /// Resolutions answered by the persistent store
    pub persistent_hits: u64,
    /// Network fetches issued
    pub remote_fetches: u64,
    /// Fetches that came back "not found"
    pub not_found: u64,
    /// Fetches that failed for any other reason
    pub failures: u64,
    /// Persistent tokens that failed to decompress
    pub decode_failures: u64,
    /// Entries currently held in memory
    pub memory_entries: usize,
}

impl CacheStatistics {
    /// Resolutions served without touching the network
    pub fn total_hits(&self) -> u64 {
        self.memory_hits + self.persistent_hits
    }

    /// Calculate hit rate over all resolutions that produced a result or a fetch
    pub fn hit_rate(&self) -> f64 {
        let total_requests = self.total_hits() + self.remote_fetches;
        if total_requests == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total_requests as f64
        }
    }
}
