//! Utility functions and helpers.
//!
//! Common functionality used across multiple modview crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{archive_file_name, sanitize_file_name};
