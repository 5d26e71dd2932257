//! Profile export decoding for modview
//!
//! A shared profile travels as a single text file: one header line followed
//! by a base64-encoded zip archive. The archive carries the profile manifest
//! as a YAML document. This crate turns those bytes back into a
//! [`Manifest`](modview_core::Manifest) and can produce the same format for
//! fixtures and exports.

pub mod archive;
pub mod manifest;
pub mod payload;
pub mod profile;

// Re-export main types
pub use archive::{create_archive, extract_member, MANIFEST_MEMBER};
pub use manifest::{parse_manifest, serialize_manifest};
pub use payload::{decode_payload, encode_payload, PROFILE_HEADER};
pub use profile::{decode_archive, decode_profile, encode_profile};

use modview_core::error::ModviewError;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, ModviewError>;
