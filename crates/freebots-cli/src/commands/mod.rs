//! CLI commands

pub mod fetch;
pub mod load;
pub mod manifest;
pub mod prefetch;
pub mod stats;

use freebots_core::cache::XmlCache;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::FreebotsResult;
use std::sync::Arc;

/// Build the cache stack every command shares
fn open_cache(config: &FreebotsConfig) -> FreebotsResult<Arc<XmlCache>> {
    config.validate()?;
    Ok(Arc::new(XmlCache::from_config(config)?))
}
