//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "freebots.toml";

#[derive(Parser)]
#[command(name = "freebots")]
#[command(about = "Free-bots XML cache - fetch, cache and load trading bot definitions")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (JSON, TOML or YAML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the bots in the remote catalog
    Manifest {
        /// Print the cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve one bot file through the cache layers
    Fetch {
        /// Storage key of the XML file
        file: String,

        /// Write the XML here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Warm the cache in throttled batches
    Prefetch {
        /// Files to prefetch (defaults to every catalog entry)
        files: Vec<String>,
    },

    /// Select a bot and load it into a directory-backed workspace
    Load {
        /// Bot name or file
        name: String,

        /// Workspace directory receiving the XML
        #[arg(long)]
        workspace: PathBuf,
    },

    /// Show the persistent cache location and contents
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}
