//! Registry access for modview
//!
//! This crate provides the relay-aware HTTP client used to download profile
//! exports and package metadata, with rate-limit backoff, and the persistent
//! enrichment cache that sits in front of it.

pub mod api;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{LatestVersion, PackageMetadata};
pub use cache::{
    CacheStats, CacheStore, EnrichmentCache, FileStore, MemoryStore, StoredEntry, SweepReport,
    CURRENT_CACHE_VERSION,
};
pub use client::{ClientConfig, RateLimitConfig, RegistryClient, Sleeper, TokioSleeper};

#[cfg(any(test, feature = "test-util"))]
pub use client::RecordingSleeper;

use modview_core::error::ModviewError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ModviewError>;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, ModviewError>;
