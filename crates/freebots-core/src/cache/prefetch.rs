//! Batched background prefetch
//!
//! Warms the cache for a list of files without flooding the remote store:
//! files go out in fixed-size batches, members of a batch run concurrently,
//! and a short pause separates batches. The spawned task is owned by a
//! [`PrefetchHandle`] so the caller can abandon it on teardown.

use super::orchestrator::XmlCache;
use crate::error::FreebotsResult;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of a prefetch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    /// Files whose resolution was started
    pub attempted: usize,
    /// Files that resolved to XML
    pub resolved: usize,
    /// Files that came back absent (not found or failed)
    pub unavailable: usize,
    /// Whether the run stopped early because it was cancelled
    pub cancelled: bool,
}

impl XmlCache {
    /// Resolve every file in throttled batches, stopping early if `cancel` fires
    ///
    /// Failures are counted, never propagated; one bad file cannot stop the
    /// rest of its batch or the batches after it.
    pub async fn prefetch(&self, files: &[String], cancel: &CancellationToken) -> PrefetchReport {
        let batch_size = self.prefetch_config().batch_size.max(1);
        let batch_pause = self.prefetch_config().batch_pause;
        let batch_count = files.len().div_ceil(batch_size);
        let mut report = PrefetchReport::default();

        for (index, batch) in files.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            report.attempted += batch.len();
            let results = join_all(batch.iter().map(|file| self.resolve(file))).await;
            let resolved = results.iter().filter(|xml| xml.is_some()).count();
            report.resolved += resolved;
            report.unavailable += batch.len() - resolved;
            debug!(batch = index + 1, of = batch_count, resolved, "prefetch batch done");

            let is_last = index + 1 == batch_count;
            if !is_last && !batch_pause.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(batch_pause) => {}
                }
            }
        }

        info!(
            attempted = report.attempted,
            resolved = report.resolved,
            unavailable = report.unavailable,
            cancelled = report.cancelled,
            "prefetch finished"
        );
        report
    }

    /// Spawn a background prefetch of `files`
    ///
    /// Must be called from within a tokio runtime.
    pub fn prefetch_all(self: &Arc<Self>, files: Vec<String>) -> PrefetchHandle {
        let token = CancellationToken::new();
        let cache = Arc::clone(self);
        let task_token = token.clone();
        let handle = tokio::spawn(async move { cache.prefetch(&files, &task_token).await });

        PrefetchHandle {
            token,
            handle: Some(handle),
            detached: false,
        }
    }
}

/// Owner of a background prefetch task
///
/// Dropping the handle cancels the task unless it was detached.
#[derive(Debug)]
pub struct PrefetchHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<PrefetchReport>>,
    detached: bool,
}

impl PrefetchHandle {
    /// Ask the task to stop before its next batch
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the task has completed
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Token observed by the task; cancel it to stop the prefetch
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the task and return its report
    pub async fn join(mut self) -> FreebotsResult<PrefetchReport> {
        match self.handle.take() {
            Some(handle) => Ok(handle.await?),
            None => Ok(PrefetchReport::default()),
        }
    }

    /// Let the task run to completion even after the handle is gone
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for PrefetchHandle {
    fn drop(&mut self) {
        if !self.detached && self.handle.is_some() {
            self.token.cancel();
        }
    }
}
