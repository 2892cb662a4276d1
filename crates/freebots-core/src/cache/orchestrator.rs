//! Layered XML resolution: memory, then persistent store, then network

use super::memory::MemoryCache;
use super::storage::{DiskStore, MemoryStore, PersistentStore};
use super::types::{CacheCounters, CacheKey, CacheLayer, CacheStatistics};
use crate::codec;
use crate::config::{FreebotsConfig, PrefetchConfig};
use crate::error::{FreebotsError, FreebotsResult};
use crate::store::{FetchOutcome, RemoteBotStore, SupabaseStore};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// XML text of the file
    pub xml: Arc<str>,
    /// Layer that answered
    pub source: CacheLayer,
}

/// Resolves file identifiers to XML text through the cache layers
///
/// Construct one per application and share it behind an `Arc`; each instance
/// owns its own memory table, so tests get isolation from fresh instances.
pub struct XmlCache {
    memory: MemoryCache,
    persistent: Option<Arc<dyn PersistentStore>>,
    remote: Arc<dyn RemoteBotStore>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
    coalesce_requests: bool,
    prefetch: PrefetchConfig,
    counters: CacheCounters,
}

impl std::fmt::Debug for XmlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlCache")
            .field("memory_entries", &self.memory.len())
            .field("persistent", &self.persistent.is_some())
            .field("coalesce_requests", &self.coalesce_requests)
            .field("prefetch", &self.prefetch)
            .finish()
    }
}

impl XmlCache {
    /// Start building a cache over `remote`
    pub fn builder(remote: Arc<dyn RemoteBotStore>) -> XmlCacheBuilder {
        XmlCacheBuilder::new(remote)
    }

    /// Build the production stack from configuration
    pub fn from_config(config: &FreebotsConfig) -> FreebotsResult<Self> {
        let remote: Arc<dyn RemoteBotStore> = Arc::new(SupabaseStore::new(&config.store)?);
        let persistent: Arc<dyn PersistentStore> = if config.cache.enable_disk_cache {
            Arc::new(DiskStore::new(&config.cache.disk_cache_dir)?)
        } else {
            Arc::new(MemoryStore::new())
        };

        XmlCacheBuilder::new(remote)
            .with_persistent(persistent)
            .with_coalescing(config.cache.coalesce_requests)
            .with_prefetch_config(config.prefetch.clone())
            .build()
    }

    /// The remote store this cache fetches from
    pub fn remote(&self) -> &Arc<dyn RemoteBotStore> {
        &self.remote
    }

    /// Prefetch throttling settings
    pub fn prefetch_config(&self) -> &PrefetchConfig {
        &self.prefetch
    }

    /// Whether `file` is already held in memory
    pub fn is_memory_cached(&self, file: &str) -> bool {
        self.memory.contains(file)
    }

    /// Get cache statistics
    pub fn statistics(&self) -> CacheStatistics {
        self.counters.snapshot(self.memory.len())
    }

    /// Resolve `file` to its XML text
    ///
    /// Not-found and transient failures both come back as `None`; use
    /// [`XmlCache::resolve_detailed`] to tell them apart.
    pub async fn resolve(&self, file: &str) -> Option<Arc<str>> {
        self.resolve_detailed(file).await.ok().map(|resolved| resolved.xml)
    }

    /// Resolve `file`, reporting which layer answered or why nothing did
    pub async fn resolve_detailed(&self, file: &str) -> FreebotsResult<Resolved> {
        if let Some(xml) = self.memory_hit(file) {
            return Ok(xml);
        }

        if !self.coalesce_requests {
            return self.resolve_from_lower_layers(file).await;
        }

        let lock = self
            .inflight
            .entry(file.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let result = {
            let _guard = lock.lock().await;
            // Another caller may have finished the fetch while we waited
            match self.memory_hit(file) {
                Some(resolved) => Ok(resolved),
                None => self.resolve_from_lower_layers(file).await,
            }
        };

        // The map and this function hold the only references when nobody else waits
        self.inflight
            .remove_if(file, |_, entry| Arc::strong_count(entry) <= 2);

        result
    }

    fn memory_hit(&self, file: &str) -> Option<Resolved> {
        let xml = self.memory.get(file)?;
        CacheCounters::bump(&self.counters.memory_hits);
        debug!(file, "memory cache hit");
        Some(Resolved {
            xml,
            source: CacheLayer::Memory,
        })
    }

    #[instrument(skip(self))]
    async fn resolve_from_lower_layers(&self, file: &str) -> FreebotsResult<Resolved> {
        let key = CacheKey::new(file);

        if let Some(xml) = self.read_persistent(&key).await {
            let xml: Arc<str> = Arc::from(xml);
            self.memory.insert(file, Arc::clone(&xml));
            CacheCounters::bump(&self.counters.persistent_hits);
            debug!("persistent cache hit");
            return Ok(Resolved {
                xml,
                source: CacheLayer::Persistent,
            });
        }

        self.fetch_remote(&key).await
    }

    /// Read and decompress the persisted token; any failure is a miss
    async fn read_persistent(&self, key: &CacheKey) -> Option<String> {
        let store = self.persistent.as_ref()?;

        let token = match store.get(key).await {
            Ok(token) => token,
            Err(e) => {
                warn!(key = %key, error = %e, "persistent cache read failed");
                return None;
            }
        };

        match codec::decompress(token.as_deref()) {
            Ok(xml) => xml,
            Err(e) => {
                CacheCounters::bump(&self.counters.decode_failures);
                warn!(key = %key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn fetch_remote(&self, key: &CacheKey) -> FreebotsResult<Resolved> {
        let file = key.file();

        if self.remote.public_url(file).is_none() {
            warn!(file, "no public URL found for bot XML");
            return Err(FreebotsError::not_found(file));
        }

        CacheCounters::bump(&self.counters.remote_fetches);
        match self.remote.fetch(file).await {
            Ok(FetchOutcome::Found(xml)) => {
                let xml: Arc<str> = Arc::from(xml);
                self.memory.insert(file, Arc::clone(&xml));
                self.write_persistent(key, Arc::clone(&xml)).await;
                Ok(Resolved {
                    xml,
                    source: CacheLayer::Remote,
                })
            }
            Ok(FetchOutcome::NotFound) => {
                CacheCounters::bump(&self.counters.not_found);
                debug!(file, "bot XML not found upstream");
                Err(FreebotsError::not_found(file))
            }
            Err(e) => {
                CacheCounters::bump(&self.counters.failures);
                warn!(file, error = %e, "failed to fetch bot XML");
                Err(e)
            }
        }
    }

    /// Compress and persist; failures only cost a future refetch
    async fn write_persistent(&self, key: &CacheKey, xml: Arc<str>) {
        let Some(store) = self.persistent.as_ref() else {
            return;
        };

        let token = match tokio::task::spawn_blocking(move || codec::compress(&xml)).await {
            Ok(token) => token,
            Err(e) => {
                warn!(key = %key, error = %e, "compression task failed");
                return;
            }
        };

        if let Err(e) = store.set(key, token).await {
            warn!(key = %key, error = %e, "persistent cache write failed");
        }
    }
}

/// Builder for [`XmlCache`]
pub struct XmlCacheBuilder {
    remote: Arc<dyn RemoteBotStore>,
    persistent: Option<Arc<dyn PersistentStore>>,
    coalesce_requests: bool,
    prefetch: PrefetchConfig,
}

impl XmlCacheBuilder {
    /// Create a new builder; no persistent layer until one is set
    pub fn new(remote: Arc<dyn RemoteBotStore>) -> Self {
        Self {
            remote,
            persistent: None,
            coalesce_requests: true,
            prefetch: PrefetchConfig::default(),
        }
    }

    /// Set the persistent layer
    pub fn with_persistent(mut self, persistent: Arc<dyn PersistentStore>) -> Self {
        self.persistent = Some(persistent);
        self
    }

    /// Enable or disable same-key request coalescing
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_requests = enabled;
        self
    }

    /// Set prefetch throttling
    pub fn with_prefetch_config(mut self, prefetch: PrefetchConfig) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Build the cache
    pub fn build(self) -> FreebotsResult<XmlCache> {
        self.prefetch.validate()?;
        Ok(XmlCache {
            memory: MemoryCache::new(),
            persistent: self.persistent,
            remote: self.remote,
            inflight: DashMap::new(),
            coalesce_requests: self.coalesce_requests,
            prefetch: self.prefetch,
            counters: CacheCounters::default(),
        })
    }
}
