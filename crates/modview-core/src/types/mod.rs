//! Core data types for modview.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Manifest types decoded from a profile export
//! - Package references derived from mod names

pub mod manifest;
pub mod package;

// Re-export all public types
pub use manifest::{Manifest, ModEntry, ModVersion};
pub use package::{PackageRef, DEFAULT_REGISTRY_URL, DEFAULT_RELAY};
