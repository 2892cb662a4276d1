//! Layered cache for bot XML files
//!
//! Resolution walks three layers, fastest first:
//!
//! - **Memory**: process-lifetime table of decoded XML, never evicted
//! - **Persistent**: gzip-compressed tokens under a namespaced key, surviving restarts
//! - **Remote**: the bot store itself, consulted only when both caches miss
//!
//! A hit in a lower layer is promoted to every faster one. Concurrent
//! resolutions of the same file share one network fetch.

pub mod memory;
pub mod orchestrator;
pub mod prefetch;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

pub use memory::MemoryCache;
pub use orchestrator::{Resolved, XmlCache, XmlCacheBuilder};
pub use prefetch::{PrefetchHandle, PrefetchReport};
pub use storage::{DiskStore, MemoryStore, PersistentStore};
pub use types::{CacheKey, CacheLayer, CacheStatistics, XML_CACHE_PREFIX};
