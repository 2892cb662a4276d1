//! Cache pipeline tests

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::codec;
    use crate::config::{FreebotsConfig, PrefetchConfig};
    use crate::error::ErrorCategory;
    use crate::testing::{CountingStore, FakeRemoteStore, FetchEvent};
    use futures::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const ALPHA: &str = r#"<xml><block type="trade_definition" id="alpha"/></xml>"#;

    fn cache_over(remote: Arc<FakeRemoteStore>, store: Arc<CountingStore>) -> XmlCache {
        XmlCache::builder(remote)
            .with_persistent(store)
            .build()
            .unwrap()
    }

    fn quick_prefetch() -> PrefetchConfig {
        PrefetchConfig {
            batch_size: 3,
            batch_pause: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_repeated_resolve_fetches_once() {
        let remote = Arc::new(FakeRemoteStore::new().with_xml("alpha.xml", ALPHA));
        let store = Arc::new(CountingStore::new());
        let cache = cache_over(Arc::clone(&remote), Arc::clone(&store));

        let first = cache.resolve_detailed("alpha.xml").await.unwrap();
        let second = cache.resolve_detailed("alpha.xml").await.unwrap();

        assert_eq!(&*first.xml, ALPHA);
        assert_eq!(first.source, CacheLayer::Remote);
        assert_eq!(second.xml, first.xml);
        assert_eq!(second.source, CacheLayer::Memory);
        assert_eq!(remote.fetch_count("alpha.xml"), 1);

        let stats = cache.statistics();
        assert_eq!(stats.remote_fetches, 1);
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.memory_entries, 1);
    }

    #[tokio::test]
    async fn test_remote_result_is_persisted_compressed() {
        let remote = Arc::new(FakeRemoteStore::new().with_xml("alpha.xml", ALPHA));
        let store = Arc::new(CountingStore::new());
        let cache = cache_over(remote, Arc::clone(&store));

        cache.resolve("alpha.xml").await.unwrap();

        let token = store.inner().get_raw(&CacheKey::new("alpha.xml")).unwrap();
        assert_ne!(token.as_slice(), ALPHA.as_bytes());
        assert_eq!(
            codec::decompress(Some(&token)).unwrap().as_deref(),
            Some(ALPHA)
        );
        assert_eq!(store.sets(), 1);
    }

    #[tokio::test]
    async fn test_persistent_hit_is_promoted_without_network() {
        let remote = Arc::new(FakeRemoteStore::new());
        let store = Arc::new(CountingStore::new());
        store
            .inner()
            .insert_raw(&CacheKey::new("beta.xml"), codec::compress(ALPHA));
        let cache = cache_over(Arc::clone(&remote), Arc::clone(&store));

        let first = cache.resolve_detailed("beta.xml").await.unwrap();
        assert_eq!(first.source, CacheLayer::Persistent);
        assert_eq!(&*first.xml, ALPHA);
        assert!(cache.is_memory_cached("beta.xml"));

        let second = cache.resolve_detailed("beta.xml").await.unwrap();
        assert_eq!(second.source, CacheLayer::Memory);

        assert_eq!(store.gets(), 1);
        assert_eq!(store.sets(), 0);
        assert_eq!(remote.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_absent_and_never_cached() {
        let remote = Arc::new(FakeRemoteStore::new().with_missing("gone.xml"));
        let store = Arc::new(CountingStore::new());
        let cache = cache_over(Arc::clone(&remote), Arc::clone(&store));

        assert!(cache.resolve("gone.xml").await.is_none());
        let err = cache.resolve_detailed("gone.xml").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        assert!(!cache.is_memory_cached("gone.xml"));
        assert_eq!(store.sets(), 0);
        // Absence is not cached, so every call asks again
        assert_eq!(remote.fetch_count("gone.xml"), 2);
        assert_eq!(cache.statistics().not_found, 2);
    }

    #[tokio::test]
    async fn test_transient_failure_is_absent_then_recovers() {
        let remote = Arc::new(FakeRemoteStore::new().with_failure("flaky.xml"));
        let store = Arc::new(CountingStore::new());
        let cache = cache_over(Arc::clone(&remote), Arc::clone(&store));

        assert!(cache.resolve("flaky.xml").await.is_none());
        let err = cache.resolve_detailed("flaky.xml").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transient);
        assert!(err.is_retryable());
        assert_eq!(store.sets(), 0);
        assert_eq!(cache.statistics().failures, 2);

        remote.set_file("flaky.xml", crate::testing::FakeFile::Xml(ALPHA.to_string()));
        assert_eq!(cache.resolve("flaky.xml").await.as_deref(), Some(ALPHA));
    }

    #[tokio::test]
    async fn test_corrupt_token_falls_through_to_network() {
        let remote = Arc::new(FakeRemoteStore::new().with_xml("alpha.xml", ALPHA));
        let store = Arc::new(CountingStore::new());
        let key = CacheKey::new("alpha.xml");
        store.inner().insert_raw(&key, b"definitely not gzip".to_vec());
        let cache = cache_over(Arc::clone(&remote), Arc::clone(&store));

        let resolved = cache.resolve_detailed("alpha.xml").await.unwrap();
        assert_eq!(resolved.source, CacheLayer::Remote);
        assert_eq!(remote.fetch_count("alpha.xml"), 1);
        assert_eq!(cache.statistics().decode_failures, 1);

        // The bad token was overwritten with a good one
        let token = store.inner().get_raw(&key).unwrap();
        assert_eq!(
            codec::decompress(Some(&token)).unwrap().as_deref(),
            Some(ALPHA)
        );
    }

    #[tokio::test]
    async fn test_missing_public_url_skips_fetch() {
        let remote = Arc::new(
            FakeRemoteStore::new()
                .with_xml("hidden.xml", ALPHA)
                .without_public_url("hidden.xml"),
        );
        let cache = cache_over(Arc::clone(&remote), Arc::new(CountingStore::new()));

        assert!(cache.resolve("hidden.xml").await.is_none());
        assert!(cache.resolve("").await.is_none());
        assert!(
            cache
                .resolve_detailed("hidden.xml")
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(remote.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let remote = Arc::new(
            FakeRemoteStore::new()
                .with_xml("alpha.xml", ALPHA)
                .with_delay(Duration::from_millis(50)),
        );
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(cache_over(Arc::clone(&remote), Arc::clone(&store)));

        let results = join_all((0..8).map(|_| cache.resolve("alpha.xml"))).await;

        assert!(results.iter().all(|xml| xml.as_deref() == Some(ALPHA)));
        assert_eq!(remote.fetch_count("alpha.xml"), 1);
        assert_eq!(store.sets(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_without_coalescing() {
        let remote = Arc::new(
            FakeRemoteStore::new()
                .with_xml("alpha.xml", ALPHA)
                .with_delay(Duration::from_millis(50)),
        );
        let cache = XmlCache::builder(remote.clone())
            .with_persistent(Arc::new(CountingStore::new()))
            .with_coalescing(false)
            .build()
            .unwrap();

        let results = join_all((0..3).map(|_| cache.resolve("alpha.xml"))).await;

        assert!(results.iter().all(|xml| xml.as_deref() == Some(ALPHA)));
        assert_eq!(remote.fetch_count("alpha.xml"), 3);
        assert_eq!(&*cache.resolve("alpha.xml").await.unwrap(), ALPHA);
        assert_eq!(remote.fetch_count("alpha.xml"), 3);
    }

    #[tokio::test]
    async fn test_without_persistent_layer() {
        let remote = Arc::new(FakeRemoteStore::new().with_xml("alpha.xml", ALPHA));
        let cache = XmlCache::builder(remote.clone()).build().unwrap();

        assert!(cache.resolve("alpha.xml").await.is_some());
        assert!(cache.resolve("alpha.xml").await.is_some());
        assert_eq!(remote.fetch_count("alpha.xml"), 1);
    }

    #[test]
    fn test_builder_rejects_zero_batch_size() {
        let remote = Arc::new(FakeRemoteStore::new());
        let result = XmlCache::builder(remote)
            .with_prefetch_config(PrefetchConfig {
                batch_size: 0,
                batch_pause: Duration::ZERO,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_without_disk() {
        let mut config = FreebotsConfig::default();
        config.store.url = "https://example.supabase.co".to_string();
        config.store.anon_key = "anon".to_string();
        config.cache.enable_disk_cache = false;

        let cache = XmlCache::from_config(&config).unwrap();
        assert_eq!(cache.prefetch_config().batch_size, 3);
        assert!(XmlCache::from_config(&FreebotsConfig::default()).is_err());
    }

    fn files(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("bot-{}.xml", i)).collect()
    }

    fn remote_with(files: &[String]) -> FakeRemoteStore {
        files
            .iter()
            .fold(FakeRemoteStore::new(), |remote, file| remote.with_xml(file, ALPHA))
    }

    #[tokio::test]
    async fn test_prefetch_survives_failures() {
        let files = files(7);
        let remote = Arc::new(remote_with(&files).with_failure("bot-4.xml"));
        let cache = XmlCache::builder(remote.clone())
            .with_prefetch_config(quick_prefetch())
            .build()
            .unwrap();

        let report = cache.prefetch(&files, &CancellationToken::new()).await;

        assert_eq!(report.attempted, 7);
        assert_eq!(report.resolved, 6);
        assert_eq!(report.unavailable, 1);
        assert!(!report.cancelled);
        for file in &files {
            assert_eq!(remote.fetch_count(file), 1, "{}", file);
            assert_eq!(cache.is_memory_cached(file), file != "bot-4.xml");
        }
    }

    #[tokio::test]
    async fn test_prefetch_batches_run_in_order() {
        let files = files(5);
        let remote = Arc::new(remote_with(&files).with_delay(Duration::from_millis(20)));
        let cache = XmlCache::builder(remote.clone())
            .with_prefetch_config(quick_prefetch())
            .build()
            .unwrap();

        cache.prefetch(&files, &CancellationToken::new()).await;

        let events = remote.events();
        let position = |event: FetchEvent| events.iter().position(|e| *e == event).unwrap();
        let second_batch_start = position(FetchEvent::Started("bot-4.xml".to_string()))
            .min(position(FetchEvent::Started("bot-5.xml".to_string())));
        for file in &files[..3] {
            assert!(position(FetchEvent::Started(file.clone())) < second_batch_start);
            assert!(position(FetchEvent::Finished(file.clone())) < second_batch_start);
        }
    }

    #[tokio::test]
    async fn test_prefetch_skips_cached_files() {
        let files = files(3);
        let remote = Arc::new(remote_with(&files));
        let cache = XmlCache::builder(remote.clone())
            .with_prefetch_config(quick_prefetch())
            .build()
            .unwrap();

        cache.resolve("bot-2.xml").await.unwrap();
        let report = cache.prefetch(&files, &CancellationToken::new()).await;

        assert_eq!(report.resolved, 3);
        assert_eq!(remote.total_fetches(), 3);
    }

    #[tokio::test]
    async fn test_prefetch_precancelled_does_nothing() {
        let files = files(4);
        let remote = Arc::new(remote_with(&files));
        let cache = XmlCache::builder(remote.clone()).build().unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let report = cache.prefetch(&files, &token).await;

        assert!(report.cancelled);
        assert_eq!(report.attempted, 0);
        assert_eq!(remote.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_prefetch_handle_cancel_stops_between_batches() {
        let files = files(6);
        let remote = Arc::new(remote_with(&files).with_delay(Duration::from_millis(30)));
        let cache = Arc::new(
            XmlCache::builder(remote.clone())
                .with_prefetch_config(PrefetchConfig {
                    batch_size: 3,
                    batch_pause: Duration::from_secs(5),
                })
                .build()
                .unwrap(),
        );

        let handle = cache.prefetch_all(files.clone());
        tokio::time::timeout(Duration::from_secs(2), async {
            while remote.total_fetches() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        handle.cancel();
        let report = tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .unwrap()
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.attempted, 3);
        assert_eq!(remote.total_fetches(), 3);
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_unless_detached() {
        let files = files(3);
        let remote = Arc::new(remote_with(&files));
        let cache = Arc::new(XmlCache::builder(remote.clone()).build().unwrap());

        let handle = cache.prefetch_all(files.clone());
        let token = handle.cancellation_token();
        drop(handle);
        assert!(token.is_cancelled());

        let handle = cache.prefetch_all(files.clone());
        let token = handle.cancellation_token();
        handle.detach();
        assert!(!token.is_cancelled());

        tokio::time::timeout(Duration::from_secs(2), async {
            while !files.iter().all(|file| cache.is_memory_cached(file)) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}
