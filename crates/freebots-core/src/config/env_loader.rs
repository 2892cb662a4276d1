//! Environment variable-based configuration overrides

use super::FreebotsConfig;
use crate::error::{FreebotsError, FreebotsResult};
use std::env;
use std::path::PathBuf;

/// Apply overrides from the process environment
///
/// `FREEBOTS_*` names win over the `VITE_*` names the web front-end uses,
/// so one `.env` file can serve both.
pub fn apply_env_overrides(config: &mut FreebotsConfig) -> FreebotsResult<()> {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides from an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut FreebotsConfig, lookup: F) -> FreebotsResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let first = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| lookup(*name).filter(|value| !value.trim().is_empty()))
    };

    if let Some(url) = first(&["FREEBOTS_SUPABASE_URL", "VITE_SUPABASE_URL"]) {
        config.store.url = url;
    }

    if let Some(key) = first(&["FREEBOTS_SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]) {
        config.store.anon_key = key;
    }

    if let Some(bucket) = first(&["FREEBOTS_BUCKET"]) {
        config.store.bucket = bucket;
    }

    if let Some(dir) = first(&["FREEBOTS_CACHE_DIR"]) {
        config.cache.disk_cache_dir = PathBuf::from(dir);
    }

    if let Some(level) = first(&["FREEBOTS_LOG_LEVEL"]) {
        config.logging.level = level;
    }

    if let Some(batch) = first(&["FREEBOTS_PREFETCH_BATCH"]) {
        config.prefetch.batch_size = batch.parse().map_err(|_| {
            FreebotsError::config_with_context(
                "Invalid FREEBOTS_PREFETCH_BATCH value",
                format!("Parsing batch size '{}'", batch),
            )
        })?;
    }

    Ok(())
}
