//! Free-bots core library
//!
//! Caching and delivery pipeline for the free trading-bot catalog: bot
//! definitions (XML) are fetched from the remote store once, kept compressed
//! on disk and decoded in memory, prefetched in throttled batches, and handed
//! to the visual workspace exactly once per selection.

pub mod cache;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod handoff;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export commonly used types
pub use cache::{
    CacheKey, CacheLayer, CacheStatistics, DiskStore, MemoryStore, PersistentStore,
    PrefetchHandle, PrefetchReport, Resolved, XmlCache, XmlCacheBuilder,
};
pub use catalog::{CardUpdate, FreeBotsCatalog};
pub use config::{FreebotsConfig, load_config};
pub use error::{ErrorCategory, FreebotsError, FreebotsResult};
pub use handoff::{ConsumeOutcome, HandoffChannel, HandoffState, LoadRequest, WorkspaceLoader};
pub use store::{BotCard, BotManifestEntry, FetchOutcome, RemoteBotStore, SupabaseStore};
