//! Manifest listing

use super::open_cache;
use crate::console::CLIConsole;
use freebots_core::catalog::FreeBotsCatalog;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::{FreebotsError, FreebotsResult};
use freebots_core::handoff::HandoffChannel;
use std::sync::Arc;

/// Print the catalog as cards
pub async fn list(config: &FreebotsConfig, json: bool) -> FreebotsResult<()> {
    let console = CLIConsole::new(true);
    let catalog = FreeBotsCatalog::new(open_cache(config)?, Arc::new(HandoffChannel::new()));

    let Some(entries) = catalog.load_manifest().await else {
        console.error("Could not fetch the bots manifest");
        return Err(FreebotsError::storage("bots manifest unavailable"));
    };
    let cards = FreeBotsCatalog::skeleton(&entries);

    if json {
        console.print_json(&serde_json::to_value(&cards)?);
        return Ok(());
    }

    console.print_header("Free Bots");
    console.print_table_header(&["Name", "File", "Difficulty", "Strategy"]);
    for card in &cards {
        console.print_table_row(&[
            card.name.as_str(),
            card.file.as_str(),
            card.difficulty.as_str(),
            card.strategy.as_str(),
        ]);
    }
    console.info("");
    console.info(&format!("{} bots in catalog", cards.len()));

    Ok(())
}
