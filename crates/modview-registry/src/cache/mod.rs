//! Enrichment cache with TTL and format versioning
//!
//! Responses are keyed by registry endpoint. Entries expire after the TTL
//! (one hour by default) and are purged lazily, either when looked up or by
//! the [`EnrichmentCache::sweep`] that runs at session start. When the
//! stored format version is older than [`CURRENT_CACHE_VERSION`] the whole
//! store is discarded.
//!
//! Stores only touch memory. Changes reach the backend in one write when
//! [`EnrichmentCache::persist`] runs at the end of an enrichment pass.

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use modview_core::error::ModviewError;

use crate::api::PackageMetadata;
use crate::CacheResult;

pub mod store;

pub use store::{CacheStore, FileStore, MemoryStore, StoredEntry};

/// Format version written by this build
pub const CURRENT_CACHE_VERSION: u32 = 1;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default number of entries kept after a sweep
pub const DEFAULT_CAPACITY: usize = 4096;

/// Outcome of a [`EnrichmentCache::sweep`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Whole store dropped because of a format version change
    pub invalidated: bool,
    /// Expired or unparsable entries removed
    pub expired: usize,
    /// Oldest entries evicted to respect capacity
    pub evicted: usize,
    /// Entries left afterwards
    pub remaining: usize,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total: usize,
    /// Number of fresh entries
    pub fresh: usize,
    /// Number of expired entries
    pub expired: usize,
}

/// Time-expiring cache of package metadata, keyed by endpoint
#[derive(Debug, Clone)]
pub struct EnrichmentCache {
    backend: Arc<dyn CacheStore>,
    ttl: Duration,
    format_version: u32,
    capacity: usize,
    dirty: Arc<AtomicBool>,
}

impl EnrichmentCache {
    /// Create a cache over an existing store
    pub fn new(backend: Arc<dyn CacheStore>) -> Self {
        Self {
            backend,
            ttl: DEFAULT_TTL,
            format_version: CURRENT_CACHE_VERSION,
            capacity: DEFAULT_CAPACITY,
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cache that lives only for this process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Cache persisted to a JSON file
    pub fn open(path: &Utf8Path) -> CacheResult<Self> {
        let store = FileStore::load_or_create(path.as_std_path())?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the format version this cache considers current
    pub fn with_format_version(mut self, version: u32) -> Self {
        self.format_version = version;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Look up an endpoint against the wall clock
    pub fn lookup(&self, endpoint: &str) -> Option<PackageMetadata> {
        self.lookup_at(endpoint, Utc::now())
    }

    /// Look up an endpoint as of `now`.
    ///
    /// Returns `None` when the entry is absent, expired or unparsable, or
    /// when the store carries an older format version. Expired and
    /// unparsable entries are removed on the way out.
    pub fn lookup_at(&self, endpoint: &str, now: DateTime<Utc>) -> Option<PackageMetadata> {
        if self.invalidate_if_stale() {
            return None;
        }

        let entry = self.backend.get(endpoint)?;

        if !self.is_fresh(&entry, now) {
            debug!("Cache entry expired for {}", endpoint);
            self.backend.remove(endpoint);
            self.mark_dirty();
            return None;
        }

        match serde_json::from_value::<PackageMetadata>(entry.data) {
            Ok(metadata) => {
                debug!("Cache hit for {}", endpoint);
                Some(metadata)
            },
            Err(e) => {
                warn!("Dropping unparsable cache entry for {}: {}", endpoint, e);
                self.backend.remove(endpoint);
                self.mark_dirty();
                None
            },
        }
    }

    /// Insert or overwrite the entry for `endpoint`.
    ///
    /// The entry is held in memory until the next [`EnrichmentCache::persist`].
    pub fn store(
        &self,
        endpoint: &str,
        metadata: &PackageMetadata,
        fetched_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        self.invalidate_if_stale();
        if self.backend.version().is_none() {
            self.backend.set_version(self.format_version);
        }

        let data = serde_json::to_value(metadata).map_err(|e| ModviewError::CacheCorrupt {
            key: endpoint.to_string(),
            reason: format!("failed to serialize metadata: {}", e),
        })?;

        self.backend.insert(
            endpoint.to_string(),
            StoredEntry {
                timestamp: fetched_at.timestamp_millis(),
                data,
            },
        );
        self.mark_dirty();

        Ok(())
    }

    /// Write pending changes to the backend on the blocking pool.
    ///
    /// Does nothing when there is nothing to write. On failure the cache
    /// stays dirty so a later call retries.
    pub async fn persist(&self) -> CacheResult<()> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || backend.flush())
            .await
            .map_err(|e| {
                ModviewError::io(
                    "Cache flush task failed".to_string(),
                    std::io::Error::new(std::io::ErrorKind::Other, e),
                )
            })
            .and_then(|flushed| flushed);

        if result.is_err() {
            self.mark_dirty();
        }
        result
    }

    /// Session-start cleanup against the wall clock
    pub fn sweep(&self) -> CacheResult<SweepReport> {
        self.sweep_at(Utc::now())
    }

    /// Session-start cleanup as of `now`.
    ///
    /// A stale format version clears everything. Otherwise expired and
    /// unparsable entries are removed and, if still over capacity, the
    /// oldest entries are evicted. The current version is stamped last.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> CacheResult<SweepReport> {
        let mut report = SweepReport::default();

        if self.is_stale_version() {
            info!(
                "Cache format changed ({:?} -> {}), clearing {} entries",
                self.backend.version(),
                self.format_version,
                self.backend.len()
            );
            self.backend.clear();
            report.invalidated = true;
        } else {
            let mut survivors = Vec::new();

            for key in self.backend.keys() {
                let Some(entry) = self.backend.get(&key) else {
                    continue;
                };

                let parsable = serde_json::from_value::<PackageMetadata>(entry.data.clone()).is_ok();
                if parsable && self.is_fresh(&entry, now) {
                    survivors.push((entry.timestamp, key));
                } else {
                    self.backend.remove(&key);
                    report.expired += 1;
                }
            }

            if survivors.len() > self.capacity {
                survivors.sort();
                let excess = survivors.len() - self.capacity;
                for (_, key) in survivors.iter().take(excess) {
                    self.backend.remove(key);
                }
                report.evicted = excess;
            }
        }

        self.backend.set_version(self.format_version);
        self.flush_now()?;

        report.remaining = self.backend.len();
        debug!(
            "Cache sweep: {} expired, {} evicted, {} remaining",
            report.expired, report.evicted, report.remaining
        );
        Ok(report)
    }

    /// Count fresh and expired entries as of `now`
    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let mut stats = CacheStats::default();

        for key in self.backend.keys() {
            let Some(entry) = self.backend.get(&key) else {
                continue;
            };
            stats.total += 1;
            if self.is_fresh(&entry, now) {
                stats.fresh += 1;
            } else {
                stats.expired += 1;
            }
        }

        stats
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }

    /// Remove every entry and persist the empty store
    pub fn clear(&self) -> CacheResult<()> {
        self.backend.clear();
        self.backend.set_version(self.format_version);
        self.flush_now()
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Synchronous write for the one-off sweep and clear commands
    fn flush_now(&self) -> CacheResult<()> {
        self.dirty.store(false, Ordering::Release);
        let result = self.backend.flush();
        if result.is_err() {
            self.mark_dirty();
        }
        result
    }

    fn is_fresh(&self, entry: &StoredEntry, now: DateTime<Utc>) -> bool {
        // Overflow or a clock that went backwards both count as stale
        match now.timestamp_millis().checked_sub(entry.timestamp) {
            Some(age_ms) if age_ms >= 0 => (age_ms as u128) < self.ttl.as_millis(),
            _ => false,
        }
    }

    /// Store written by an older format, or an unversioned non-empty store
    fn is_stale_version(&self) -> bool {
        match self.backend.version() {
            Some(version) => version < self.format_version,
            None => !self.backend.is_empty(),
        }
    }

    /// Drop the whole store if its version is stale; true if it was dropped
    fn invalidate_if_stale(&self) -> bool {
        if !self.is_stale_version() {
            return false;
        }

        info!("Cache format is out of date, invalidating");
        self.backend.clear();
        self.backend.set_version(self.format_version);
        self.mark_dirty();
        true
    }
}
