//! Supabase-backed remote bot store
//!
//! Catalog rows come from the PostgREST endpoint and XML files from the public
//! storage bucket.

use super::{BotManifestEntry, FetchOutcome, RemoteBotStore};
use crate::config::StoreConfig;
use crate::error::{FreebotsError, FreebotsResult};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, instrument, warn};

/// Remote bot store talking to a Supabase project over HTTP
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http_client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    bucket: String,
    table: String,
}

impl SupabaseStore {
    /// Create a store from configuration
    pub fn new(config: &StoreConfig) -> FreebotsResult<Self> {
        config.validate()?;

        let base_url = Url::parse(config.url.trim()).map_err(|e| {
            FreebotsError::config_with_context(
                format!("Invalid Supabase URL: {}", e),
                format!("Parsing '{}'", config.url),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FreebotsError::config(format!(
                "Supabase URL '{}' cannot be used as a base URL",
                config.url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("freebots/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FreebotsError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            anon_key: config.anon_key.clone(),
            bucket: config.bucket.clone(),
            table: config.table.clone(),
        })
    }

    /// Build `base/<segments...>`, percent-encoding each segment
    fn join_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Option<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Some(url)
    }

    fn table_url(&self) -> Option<Url> {
        let mut url = self.join_segments(["rest", "v1", self.table.as_str()])?;
        url.query_pairs_mut().append_pair("select", "*");
        Some(url)
    }
}

#[async_trait]
impl RemoteBotStore for SupabaseStore {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn list(&self) -> FreebotsResult<Vec<BotManifestEntry>> {
        let url = self
            .table_url()
            .ok_or_else(|| FreebotsError::config("Cannot derive table URL"))?;

        debug!("Fetching bots manifest from: {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Bots table query failed: {} - {}", status, error_text);
            return Err(FreebotsError::http_status(url.as_str(), status.as_u16()));
        }

        let entries: Vec<BotManifestEntry> = response
            .json()
            .await
            .map_err(|e| FreebotsError::json(format!("Failed to parse bots manifest: {}", e)))?;

        debug!("Fetched {} manifest entries", entries.len());
        Ok(entries)
    }

    fn public_url(&self, file: &str) -> Option<Url> {
        let file = file.trim_matches('/');
        if file.is_empty() {
            return None;
        }

        let prefix = ["storage", "v1", "object", "public", self.bucket.as_str()];
        self.join_segments(prefix.into_iter().chain(file.split('/')))
    }

    #[instrument(skip(self))]
    async fn fetch(&self, file: &str) -> FreebotsResult<FetchOutcome> {
        let url = self
            .public_url(file)
            .ok_or_else(|| FreebotsError::invalid_field("file", "no public URL for empty file"))?;

        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(FreebotsError::http_status(url.as_str(), status.as_u16()));
        }

        let xml = response.text().await?;
        Ok(FetchOutcome::Found(xml))
    }
}
