//! Sequential metadata enrichment for a profile's mods
//!
//! Entries are processed strictly in manifest order. A cached response is
//! used immediately; a miss waits for the configured spacing and then asks
//! the registry. A failure on one entry is logged and the pass moves on.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use modview_core::ModEntry;
use modview_registry::{EnrichmentCache, PackageMetadata, RegistryClient, Sleeper, TokioSleeper};

use crate::ResolverResult;

/// Default spacing before each live request
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Where an entry's metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOrigin {
    Cache,
    Live,
}

/// A mod paired with its registry metadata
#[derive(Debug, Clone)]
pub struct EnrichedMod {
    /// Position in the manifest
    pub index: usize,
    pub entry: ModEntry,
    pub metadata: PackageMetadata,
    pub origin: EnrichmentOrigin,
}

/// Progress of an enrichment pass, in manifest order
#[derive(Debug, Clone)]
pub enum EnrichmentEvent {
    Enriched(EnrichedMod),
    Skipped {
        index: usize,
        entry: ModEntry,
        reason: String,
    },
}

impl EnrichmentEvent {
    pub fn index(&self) -> usize {
        match self {
            EnrichmentEvent::Enriched(enriched) => enriched.index,
            EnrichmentEvent::Skipped { index, .. } => *index,
        }
    }
}

/// Counts from a finished pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Served from cache
    pub hits: usize,
    /// Fetched from the registry
    pub live: usize,
    /// Failed and skipped
    pub skipped: usize,
}

/// Enrichment orchestrator
#[derive(Debug, Clone)]
pub struct Enricher {
    client: Arc<RegistryClient>,
    cache: Arc<EnrichmentCache>,
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Enricher {
    /// Create an enricher with the default request spacing
    pub fn new(client: Arc<RegistryClient>, cache: Arc<EnrichmentCache>) -> Self {
        Self {
            client,
            cache,
            interval: DEFAULT_INTERVAL,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Spacing applied before every live request
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the timer used for request spacing
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Enrich `mods` in order, calling `on_each` for every success.
    ///
    /// Failed entries never reach `on_each` and never stop the pass.
    pub async fn enrich<F>(&self, mods: &[ModEntry], mut on_each: F) -> EnrichmentSummary
    where
        F: FnMut(&EnrichedMod),
    {
        self.run(mods, |event| {
            if let EnrichmentEvent::Enriched(enriched) = &event {
                on_each(enriched);
            }
        })
        .await
    }

    /// Run the pass on a background task and report through a channel.
    ///
    /// The channel closes once every entry has produced an event. Dropping
    /// the receiver does not stop the pass.
    pub fn stream(&self, mods: Vec<ModEntry>) -> mpsc::UnboundedReceiver<EnrichmentEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let enricher = self.clone();

        tokio::spawn(async move {
            enricher
                .run(&mods, |event| {
                    // Receiver may be gone; keep going regardless
                    let _ = tx.send(event);
                })
                .await;
        });

        rx
    }

    async fn run<F>(&self, mods: &[ModEntry], mut emit: F) -> EnrichmentSummary
    where
        F: FnMut(EnrichmentEvent),
    {
        let mut summary = EnrichmentSummary::default();

        for (index, entry) in mods.iter().enumerate() {
            match self.enrich_one(entry).await {
                Ok((metadata, origin)) => {
                    match origin {
                        EnrichmentOrigin::Cache => summary.hits += 1,
                        EnrichmentOrigin::Live => summary.live += 1,
                    }
                    emit(EnrichmentEvent::Enriched(EnrichedMod {
                        index,
                        entry: entry.clone(),
                        metadata,
                        origin,
                    }));
                },
                Err(e) => {
                    warn!("Error fetching mod data for {}: {}", entry.name, e);
                    summary.skipped += 1;
                    emit(EnrichmentEvent::Skipped {
                        index,
                        entry: entry.clone(),
                        reason: e.to_string(),
                    });
                },
            }
        }

        if let Err(e) = self.cache.persist().await {
            warn!("Failed to persist enrichment cache: {}", e);
        }

        info!(
            "Enriched {} mods ({} cached, {} fetched, {} skipped)",
            mods.len(),
            summary.hits,
            summary.live,
            summary.skipped
        );
        summary
    }

    async fn enrich_one(&self, entry: &ModEntry) -> ResolverResult<(PackageMetadata, EnrichmentOrigin)> {
        let package = entry.package_ref()?;
        let endpoint = self.client.package_endpoint(&package)?;

        if let Some(metadata) = self.cache.lookup(&endpoint) {
            return Ok((metadata, EnrichmentOrigin::Cache));
        }

        self.sleeper.sleep(self.interval).await;

        debug!("Fetching metadata for {}", package);
        let metadata = self.client.fetch_package(&endpoint).await?;

        if let Err(e) = self.cache.store(&endpoint, &metadata, Utc::now()) {
            warn!("Failed to cache metadata for {}: {}", package, e);
        }

        Ok((metadata, EnrichmentOrigin::Live))
    }
}
