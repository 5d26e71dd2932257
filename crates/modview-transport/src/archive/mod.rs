//! Zip archive handling for profile exports
//!
//! This module reads and writes the zip container embedded in a profile
//! export. Only the manifest member is ever interpreted.

pub mod create;
pub mod extract;

/// Name of the manifest member at the root of every profile archive
pub const MANIFEST_MEMBER: &str = "export.r2x";

// Re-export main functions
pub use create::create_archive;
pub use extract::extract_member;
