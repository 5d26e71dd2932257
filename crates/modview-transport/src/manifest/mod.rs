//! Manifest document parsing
//!
//! `export.r2x` is YAML. Anything that does not fit the manifest shape is
//! rejected outright rather than partially rendered.

use modview_core::error::ModviewError;
use modview_core::Manifest;

use crate::TransportResult;

/// Parse manifest bytes extracted from a profile archive
pub fn parse_manifest(bytes: &[u8]) -> TransportResult<Manifest> {
    let text = std::str::from_utf8(bytes).map_err(|e| ModviewError::ManifestInvalid {
        message: format!("manifest is not UTF-8: {}", e),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    serde_yaml_ng::from_str(text).map_err(|e| ModviewError::ManifestInvalid {
        message: e.to_string(),
    })
}

/// Serialize a manifest into its YAML document form
pub fn serialize_manifest(manifest: &Manifest) -> TransportResult<String> {
    serde_yaml_ng::to_string(manifest).map_err(|e| ModviewError::ManifestInvalid {
        message: format!("failed to serialize manifest: {}", e),
    })
}
