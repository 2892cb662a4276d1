//! Free-bots CLI
//!
//! Command-line front-end to the free-bots XML cache.
//!
//! ```bash
//! freebots manifest                         # list the catalog
//! freebots fetch over_under_pro.xml         # resolve one file through the cache
//! freebots prefetch                         # warm the cache for every bot
//! freebots load "Over Under Pro" --workspace ./workspace
//! freebots stats                            # show the persistent cache
//! ```
//!
//! Store credentials come from the config file or from
//! `FREEBOTS_SUPABASE_URL` / `FREEBOTS_SUPABASE_ANON_KEY` (a `.env` file is
//! honoured). Set `RUST_LOG` to override the configured log level.

mod args;
mod commands;
mod console;
mod router;
mod workspace;

use args::Cli;
use clap::Parser;
use freebots_core::config::{FreebotsConfig, load_config};
use freebots_core::error::FreebotsResult;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> FreebotsResult<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config_file)?;
    init_logging(&config, cli.verbose);

    router::route(cli, config).await
}

fn init_logging(config: &FreebotsConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
