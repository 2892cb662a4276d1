//! Instrumented fakes for the external collaborators
//!
//! Available to unit tests and, with the `test-support` feature, to other crates.

use crate::cache::{CacheKey, MemoryStore, PersistentStore};
use crate::error::{FreebotsError, FreebotsResult};
use crate::handoff::{LoadRequest, WorkspaceLoader};
use crate::store::{BotManifestEntry, FetchOutcome, RemoteBotStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// How the fake store answers for one file
#[derive(Debug, Clone)]
pub enum FakeFile {
    Xml(String),
    Missing,
    Failing,
}

/// Fetch lifecycle event recorded by [`FakeRemoteStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started(String),
    Finished(String),
}

/// In-process remote store that counts every fetch
#[derive(Debug, Default)]
pub struct FakeRemoteStore {
    files: Mutex<HashMap<String, FakeFile>>,
    entries: Mutex<Vec<BotManifestEntry>>,
    fetch_counts: Mutex<HashMap<String, usize>>,
    events: Mutex<Vec<FetchEvent>>,
    delay: Mutex<Option<Duration>>,
    without_url: Mutex<Vec<String>>,
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_xml(self, file: &str, xml: &str) -> Self {
        self.set_file(file, FakeFile::Xml(xml.to_string()));
        self
    }

    pub fn with_missing(self, file: &str) -> Self {
        self.set_file(file, FakeFile::Missing);
        self
    }

    pub fn with_failure(self, file: &str) -> Self {
        self.set_file(file, FakeFile::Failing);
        self
    }

    /// Make `public_url` return `None` for `file`
    pub fn without_public_url(self, file: &str) -> Self {
        self.without_url.lock().push(file.to_string());
        self
    }

    /// Delay every fetch by `delay`
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    pub fn with_entries(self, entries: Vec<BotManifestEntry>) -> Self {
        *self.entries.lock() = entries;
        self
    }

    pub fn set_file(&self, file: &str, answer: FakeFile) {
        self.files.lock().insert(file.to_string(), answer);
    }

    pub fn fetch_count(&self, file: &str) -> usize {
        self.fetch_counts.lock().get(file).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.lock().values().sum()
    }

    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl RemoteBotStore for FakeRemoteStore {
    async fn list(&self) -> FreebotsResult<Vec<BotManifestEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn public_url(&self, file: &str) -> Option<Url> {
        if file.is_empty() || self.without_url.lock().iter().any(|f| f == file) {
            return None;
        }
        Url::parse("https://fake.supabase.test/storage/v1/object/public/bot-xml-files/")
            .ok()?
            .join(file)
            .ok()
    }

    async fn fetch(&self, file: &str) -> FreebotsResult<FetchOutcome> {
        *self.fetch_counts.lock().entry(file.to_string()).or_default() += 1;
        self.events.lock().push(FetchEvent::Started(file.to_string()));

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let answer = self.files.lock().get(file).cloned();
        self.events.lock().push(FetchEvent::Finished(file.to_string()));

        match answer {
            Some(FakeFile::Xml(xml)) => Ok(FetchOutcome::Found(xml)),
            Some(FakeFile::Missing) | None => Ok(FetchOutcome::NotFound),
            Some(FakeFile::Failing) => Err(FreebotsError::http_status(
                format!("https://fake.supabase.test/{}", file),
                503,
            )),
        }
    }
}

/// Persistent store wrapper that counts reads and writes
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl PersistentStore for CountingStore {
    async fn get(&self, key: &CacheKey) -> FreebotsResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &CacheKey, token: Vec<u8>) -> FreebotsResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, token).await
    }

    async fn remove(&self, key: &CacheKey) -> FreebotsResult<()> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> FreebotsResult<()> {
        self.inner.clear().await
    }

    async fn len(&self) -> FreebotsResult<usize> {
        self.inner.len().await
    }
}

/// Workspace loader that records every load
#[derive(Debug)]
pub struct RecordingLoader {
    ready: AtomicBool,
    fail: AtomicBool,
    gate: Option<Arc<Notify>>,
    loads: Mutex<Vec<LoadRequest>>,
}

impl Default for RecordingLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            gate: None,
            loads: Mutex::new(Vec::new()),
        }
    }

    /// Hold every load until `gate` is notified
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().len()
    }

    pub fn loads(&self) -> Vec<LoadRequest> {
        self.loads.lock().clone()
    }
}

#[async_trait]
impl WorkspaceLoader for RecordingLoader {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn load(&self, request: LoadRequest) -> FreebotsResult<()> {
        self.loads.lock().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FreebotsError::other("workspace rejected the XML"));
        }
        Ok(())
    }
}
