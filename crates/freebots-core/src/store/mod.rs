//! Remote bot store abstraction
//!
//! The remote store is the hosted database + object storage that holds the
//! catalog rows and the XML strategy files. Only the three operations the
//! cache needs are modelled here.

mod manifest;
mod supabase;

pub use manifest::{BotCard, BotManifestEntry, DEFAULT_FEATURES};
pub use supabase::SupabaseStore;

use crate::error::FreebotsResult;
use async_trait::async_trait;
use reqwest::Url;
use tracing::warn;

/// Result of fetching one file from the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file exists; carries its XML text
    Found(String),
    /// The store answered "not found"
    NotFound,
}

/// Remote bot store interface
#[async_trait]
pub trait RemoteBotStore: Send + Sync {
    /// List every catalog entry
    async fn list(&self) -> FreebotsResult<Vec<BotManifestEntry>>;

    /// Public address of `file`, if one can be derived
    fn public_url(&self, file: &str) -> Option<Url>;

    /// Fetch the XML text of `file`
    ///
    /// A 404 is `Ok(FetchOutcome::NotFound)`; transport failures and other
    /// non-success statuses are errors.
    async fn fetch(&self, file: &str) -> FreebotsResult<FetchOutcome>;
}

/// Fetch the manifest, logging and swallowing any failure
pub async fn get_bots_manifest(store: &dyn RemoteBotStore) -> Option<Vec<BotManifestEntry>> {
    match store.list().await {
        Ok(entries) => Some(entries),
        Err(e) => {
            warn!(error = %e, "failed to fetch bots manifest");
            None
        }
    }
}
