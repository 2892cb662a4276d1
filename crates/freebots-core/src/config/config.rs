//! Configuration structures

use super::LoggingConfig;
use crate::error::{FreebotsError, FreebotsResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FreebotsConfig {
    /// Remote bot store settings
    pub store: StoreConfig,
    /// Local cache layers
    pub cache: CacheConfig,
    /// Background prefetch throttling
    pub prefetch: PrefetchConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl FreebotsConfig {
    /// Validate the settings needed to talk to the remote store
    pub fn validate(&self) -> FreebotsResult<()> {
        self.store.validate()?;
        self.prefetch.validate()
    }
}

/// Remote bot store (Supabase project) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous API key
    pub anon_key: String,
    /// Storage bucket holding the XML files
    pub bucket: String,
    /// Table listing the catalog entries
    pub table: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            bucket: "bot-xml-files".to_string(),
            table: "bots".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Check that the store can be reached with these settings
    pub fn validate(&self) -> FreebotsResult<()> {
        if self.url.trim().is_empty() {
            return Err(FreebotsError::config_with_context(
                "Supabase URL is missing",
                "Set store.url or FREEBOTS_SUPABASE_URL / VITE_SUPABASE_URL",
            ));
        }
        if self.anon_key.trim().is_empty() {
            return Err(FreebotsError::config_with_context(
                "Supabase anon key is missing",
                "Set store.anon_key or FREEBOTS_SUPABASE_ANON_KEY / VITE_SUPABASE_ANON_KEY",
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(FreebotsError::config("Storage bucket name is empty"));
        }
        Ok(())
    }
}

/// Local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep compressed XML on disk between runs
    pub enable_disk_cache: bool,
    /// Disk cache directory
    pub disk_cache_dir: PathBuf,
    /// Let concurrent lookups of the same file share one fetch
    pub coalesce_requests: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_disk_cache: true,
            disk_cache_dir: default_cache_dir(),
            coalesce_requests: true,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".freebots").join("cache"))
        .unwrap_or_else(|| PathBuf::from(".freebots-cache"))
}

/// Background prefetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Files resolved concurrently per batch
    pub batch_size: usize,
    /// Pause between consecutive batches
    #[serde(with = "humantime_serde")]
    pub batch_pause: Duration,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_pause: Duration::from_millis(100),
        }
    }
}

impl PrefetchConfig {
    /// Reject a zero batch size
    pub fn validate(&self) -> FreebotsResult<()> {
        if self.batch_size == 0 {
            return Err(FreebotsError::invalid_field(
                "prefetch.batch_size",
                "batch size must be at least 1",
            ));
        }
        Ok(())
    }
}
