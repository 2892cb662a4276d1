//! Persistent cache inspection

use crate::console::CLIConsole;
use colored::*;
use freebots_core::cache::{DiskStore, PersistentStore};
use freebots_core::config::FreebotsConfig;
use freebots_core::error::FreebotsResult;

/// Show where the persistent cache lives and how much it holds
pub async fn show(config: &FreebotsConfig, json: bool) -> FreebotsResult<()> {
    let console = CLIConsole::new(true);
    let dir = &config.cache.disk_cache_dir;

    let entries = if config.cache.enable_disk_cache && dir.is_dir() {
        Some(DiskStore::new(dir)?.len().await?)
    } else {
        None
    };

    if json {
        console.print_json(&serde_json::json!({
            "enabled": config.cache.enable_disk_cache,
            "directory": dir.display().to_string(),
            "entries": entries,
            "coalesce_requests": config.cache.coalesce_requests,
            "prefetch_batch_size": config.prefetch.batch_size,
        }));
        return Ok(());
    }

    console.print_header("Cache");
    let enabled = if config.cache.enable_disk_cache {
        "✓ Enabled".green()
    } else {
        "✗ Disabled".red()
    };
    console.print_field("disk cache", &enabled.to_string());
    console.print_field("directory", &dir.display().to_string().cyan().to_string());
    console.print_field(
        "entries",
        &entries.map_or_else(|| "-".to_string(), |n| n.to_string()),
    );
    console.print_field(
        "request coalescing",
        if config.cache.coalesce_requests { "on" } else { "off" },
    );
    console.print_field(
        "prefetch",
        &format!(
            "{} per batch, {:?} pause",
            config.prefetch.batch_size, config.prefetch.batch_pause
        ),
    );

    Ok(())
}
