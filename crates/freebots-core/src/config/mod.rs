//! Configuration management for the free-bots cache

// Internal modules
#[allow(clippy::module_inception)] // config module in config directory is intentional
mod config;
mod env_loader;
mod file_loader;
mod logging_config;

// Re-export public API
pub use config::{CacheConfig, FreebotsConfig, PrefetchConfig, StoreConfig};
pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::load_from_file;
pub use logging_config::LoggingConfig;

use crate::error::FreebotsResult;
use std::path::Path;

/// Load configuration from `path` (if it exists), then apply environment overrides
pub fn load_config(path: &Path) -> FreebotsResult<FreebotsConfig> {
    let mut config = load_from_file(path)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}
