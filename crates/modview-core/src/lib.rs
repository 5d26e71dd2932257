//! # modview-core
//!
//! Core types and utilities shared across all modview crates.
//!
//! This crate provides:
//! - Manifest, ModEntry and ModVersion types decoded from a profile export
//! - PackageRef for turning a mod name into a registry namespace/name pair
//! - ModviewError enum for unified error handling
//! - Utility functions for common operations
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Manifest, ModEntry, PackageRef)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ModviewError, ModviewResult};
pub use types::{Manifest, ModEntry, ModVersion, PackageRef};
