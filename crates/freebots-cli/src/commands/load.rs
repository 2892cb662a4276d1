//! Select a bot and hand it to a directory workspace

use super::open_cache;
use crate::console::CLIConsole;
use crate::workspace::DirectoryWorkspace;
use freebots_core::catalog::FreeBotsCatalog;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::{FreebotsError, FreebotsResult};
use freebots_core::handoff::{ConsumeOutcome, HandoffChannel};
use freebots_core::store::{BotCard, BotManifestEntry};
use std::path::Path;
use std::sync::Arc;

/// Load the bot named `name` (or stored as `name`) into `workspace`
pub async fn load(config: &FreebotsConfig, name: &str, workspace: &Path) -> FreebotsResult<()> {
    let console = CLIConsole::new(true);
    let handoff = Arc::new(HandoffChannel::new());
    let catalog = FreeBotsCatalog::new(open_cache(config)?, Arc::clone(&handoff));

    let entries = catalog
        .load_manifest()
        .await
        .ok_or_else(|| FreebotsError::storage("bots manifest unavailable"))?;
    let entry = find_entry(&entries, name).ok_or_else(|| {
        console.error(&format!("No bot named {name}"));
        FreebotsError::not_found(name)
    })?;

    let Some(xml) = catalog.cache().resolve(&entry.file).await else {
        console.warn(&format!("{} is still unavailable; not loading", entry.file));
        return Err(FreebotsError::not_found(entry.file.clone()));
    };
    let card = BotCard::from(entry).with_xml(xml.as_ref());
    catalog.select(&card);

    let loader = DirectoryWorkspace::new(workspace);
    match handoff.try_consume(&loader).await {
        ConsumeOutcome::Loaded(name) => {
            console.success(&format!(
                "Loaded {} into {}",
                name,
                loader.target_path(&name).display()
            ));
            Ok(())
        }
        ConsumeOutcome::NotReady => {
            console.error(&format!(
                "Workspace directory {} does not exist",
                workspace.display()
            ));
            Err(FreebotsError::invalid_field("workspace", "directory does not exist"))
        }
        ConsumeOutcome::Failed { error, .. } => {
            console.error(&format!("Workspace rejected the bot: {error}"));
            Err(error)
        }
        other => Err(FreebotsError::other(format!(
            "unexpected hand-off outcome: {:?}",
            other
        ))),
    }
}

/// Match on display name (case-insensitive) or exact file
fn find_entry<'a>(entries: &'a [BotManifestEntry], name: &str) -> Option<&'a BotManifestEntry> {
    entries
        .iter()
        .find(|entry| entry.file == name)
        .or_else(|| {
            entries
                .iter()
                .find(|entry| entry.display_name().eq_ignore_ascii_case(name.trim()))
        })
}
