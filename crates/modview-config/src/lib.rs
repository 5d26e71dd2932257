//! Configuration parsing for modview
//!
//! This crate handles parsing and validation of modview.toml files and
//! layers global, project, environment and command-line settings into a
//! single [`ModviewToml`].

pub mod merge;
pub mod toml;

// Re-export main types
pub use crate::merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use crate::toml::{CacheSection, FetchSection, ModviewToml, RegistrySection};

use modview_core::error::ModviewError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ModviewError>;
