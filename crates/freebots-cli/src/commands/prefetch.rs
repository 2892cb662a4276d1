//! Cache warm-up

use super::open_cache;
use crate::console::CLIConsole;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::{FreebotsError, FreebotsResult};
use freebots_core::store;

/// Prefetch `files`, or every catalog entry when none are given
///
/// Ctrl-C stops the run between batches.
pub async fn prefetch(config: &FreebotsConfig, files: Vec<String>) -> FreebotsResult<()> {
    let mut console = CLIConsole::new(true);
    let cache = open_cache(config)?;

    let files = if files.is_empty() {
        let Some(entries) = store::get_bots_manifest(cache.remote().as_ref()).await else {
            console.error("Could not fetch the bots manifest");
            return Err(FreebotsError::storage("bots manifest unavailable"));
        };
        entries.into_iter().map(|entry| entry.file).collect()
    } else {
        files
    };

    if files.is_empty() {
        console.warn("Nothing to prefetch");
        return Ok(());
    }

    console.start_progress(&format!(
        "Prefetching {} files in batches of {}",
        files.len(),
        cache.prefetch_config().batch_size
    ));

    let handle = cache.prefetch_all(files);
    let token = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let report = handle.join().await;
    interrupt.abort();
    let report = report?;

    console.finish_progress(&format!(
        "{} of {} files cached",
        report.resolved, report.attempted
    ));

    if report.cancelled {
        console.warn("Prefetch interrupted");
    }
    if report.unavailable > 0 {
        console.warn(&format!("{} files unavailable", report.unavailable));
    } else if !report.cancelled {
        console.success("Cache is warm");
    }

    let stats = cache.statistics();
    console.print_field("network fetches", &stats.remote_fetches.to_string());
    console.print_field("disk hits", &stats.persistent_hits.to_string());
    console.print_field("memory entries", &stats.memory_entries.to_string());

    Ok(())
}
