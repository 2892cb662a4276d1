//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::FreebotsResult;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: FreebotsConfig) -> FreebotsResult<()> {
    match cli.command {
        Commands::Manifest { json } => commands::manifest::list(&config, json).await,
        Commands::Fetch { file, output } => {
            commands::fetch::fetch(&config, &file, output.as_deref()).await
        }
        Commands::Prefetch { files } => commands::prefetch::prefetch(&config, files).await,
        Commands::Load { name, workspace } => {
            commands::load::load(&config, &name, &workspace).await
        }
        Commands::Stats { json } => commands::stats::show(&config, json).await,
    }
}
