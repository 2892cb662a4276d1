//! Free-bots catalog view model
//!
//! Renders the manifest as cards right away, fills in XML as it resolves and
//! hands the chosen bot to the workspace through the [`HandoffChannel`].

use crate::cache::XmlCache;
use crate::handoff::HandoffChannel;
use crate::store::{self, BotCard, BotManifestEntry};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A card whose XML just became available
#[derive(Debug, Clone)]
pub struct CardUpdate {
    /// Position of the entry in the list passed to `load_progressive`
    pub index: usize,
    pub card: BotCard,
}

/// Catalog of free bots backed by the XML cache
#[derive(Debug, Clone)]
pub struct FreeBotsCatalog {
    cache: Arc<XmlCache>,
    handoff: Arc<HandoffChannel>,
}

impl FreeBotsCatalog {
    pub fn new(cache: Arc<XmlCache>, handoff: Arc<HandoffChannel>) -> Self {
        Self { cache, handoff }
    }

    pub fn cache(&self) -> &Arc<XmlCache> {
        &self.cache
    }

    pub fn handoff(&self) -> &Arc<HandoffChannel> {
        &self.handoff
    }

    /// Fetch the manifest; `None` when the store could not be reached
    pub async fn load_manifest(&self) -> Option<Vec<BotManifestEntry>> {
        store::get_bots_manifest(self.cache.remote().as_ref()).await
    }

    /// Cards for every entry, none of them loadable yet
    pub fn skeleton(entries: &[BotManifestEntry]) -> Vec<BotCard> {
        entries.iter().map(BotCard::from).collect()
    }

    /// Resolve every entry concurrently, sending each card as its XML arrives
    ///
    /// Entries whose XML is unavailable produce no update. The receiver sees
    /// the channel close once every resolution has finished. Must be called
    /// from within a tokio runtime.
    pub fn load_progressive(&self, entries: Vec<BotManifestEntry>) -> mpsc::Receiver<CardUpdate> {
        let (tx, rx) = mpsc::channel(entries.len().max(1));
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            let mut pending: FuturesUnordered<_> = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let cache = Arc::clone(&cache);
                    async move { (index, entry, cache.resolve(&entry.file).await) }
                })
                .collect();

            let mut loaded = 0usize;
            while let Some((index, entry, xml)) = pending.next().await {
                let Some(xml) = xml else {
                    debug!(file = %entry.file, "bot stays in loading state");
                    continue;
                };
                loaded += 1;
                let card = BotCard::from(entry).with_xml(xml.as_ref());
                if tx.send(CardUpdate { index, card }).await.is_err() {
                    debug!("catalog receiver dropped, stopping progressive load");
                    return;
                }
            }

            info!(loaded, total = entries.len(), "catalog load finished");
        });

        rx
    }

    /// Resolve every entry and return the full card list
    pub async fn load_all(&self, entries: Vec<BotManifestEntry>) -> Vec<BotCard> {
        let mut cards = Self::skeleton(&entries);
        let mut updates = self.load_progressive(entries);
        while let Some(update) = updates.recv().await {
            cards[update.index] = update.card;
        }
        cards
    }

    /// Publish the card to the workspace; `false` while its XML is still loading
    pub fn select(&self, card: &BotCard) -> bool {
        match &card.xml {
            Some(xml) => {
                info!(bot = %card.name, "bot selected");
                self.handoff.publish(card.name.clone(), xml.clone());
                true
            }
            None => {
                debug!(bot = %card.name, "ignoring selection of bot without XML");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::{HandoffState, LoadRequest};
    use crate::testing::{FakeRemoteStore, RecordingLoader};

    fn entries() -> Vec<BotManifestEntry> {
        vec![
            BotManifestEntry::new("1", "Alpha", "alpha.xml"),
            BotManifestEntry::new("2", "", "beta_bot.xml"),
            BotManifestEntry::new("3", "Gamma", "gamma.xml"),
        ]
    }

    fn catalog(remote: FakeRemoteStore) -> FreeBotsCatalog {
        let cache = XmlCache::builder(Arc::new(remote)).build().unwrap();
        FreeBotsCatalog::new(Arc::new(cache), Arc::new(HandoffChannel::new()))
    }

    #[test]
    fn test_skeleton_is_not_loadable() {
        let cards = FreeBotsCatalog::skeleton(&entries());
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1].name, "beta bot");
        assert!(cards.iter().all(|card| !card.is_loadable()));
    }

    #[tokio::test]
    async fn test_progressive_load_skips_unavailable() {
        let catalog = catalog(
            FakeRemoteStore::new()
                .with_xml("alpha.xml", "<xml>a</xml>")
                .with_failure("beta_bot.xml")
                .with_xml("gamma.xml", "<xml>g</xml>"),
        );

        let mut updates = catalog.load_progressive(entries());
        let mut seen = Vec::new();
        while let Some(update) = updates.recv().await {
            assert!(update.card.is_loadable());
            seen.push(update.index);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_load_all_keeps_order() {
        let catalog = catalog(
            FakeRemoteStore::new()
                .with_xml("alpha.xml", "<xml>a</xml>")
                .with_xml("gamma.xml", "<xml>g</xml>"),
        );

        let cards = catalog.load_all(entries()).await;
        assert_eq!(cards[0].xml.as_deref(), Some("<xml>a</xml>"));
        assert_eq!(cards[1].xml, None);
        assert_eq!(cards[2].xml.as_deref(), Some("<xml>g</xml>"));
    }

    #[tokio::test]
    async fn test_load_manifest() {
        let catalog = catalog(FakeRemoteStore::new().with_entries(entries()));
        assert_eq!(catalog.load_manifest().await, Some(entries()));
    }

    #[tokio::test]
    async fn test_select_publishes_only_loaded_cards() {
        let catalog = catalog(FakeRemoteStore::new());
        let loader = RecordingLoader::new();
        let card = BotCard::from(&BotManifestEntry::new("1", "Alpha", "alpha.xml"));

        assert!(!catalog.select(&card));
        assert_eq!(catalog.handoff().state(), HandoffState::Empty);

        assert!(catalog.select(&card.with_xml("<xml/>")));
        assert!(catalog.handoff().try_consume(&loader).await.is_loaded());
        assert_eq!(
            loader.loads(),
            vec![LoadRequest {
                xml_text: "<xml/>".to_string(),
                display_name: "Alpha".to_string(),
            }]
        );
    }
}
