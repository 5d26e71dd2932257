//! Profile resolution and enrichment for modview
//!
//! [`ProfileResolver`] downloads and decodes a shared profile into a
//! skeleton that can be rendered straight away. [`Enricher`] then walks the
//! mod list in order, filling in registry metadata from the cache or, with
//! a fixed spacing between requests, from the registry itself.

pub mod enrich;
pub mod profile;

// Re-export main types
pub use enrich::{EnrichedMod, EnrichmentEvent, EnrichmentOrigin, EnrichmentSummary, Enricher};
pub use profile::{ProfileResolver, ResolvedProfile};

use modview_core::error::ModviewError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ModviewError>;
