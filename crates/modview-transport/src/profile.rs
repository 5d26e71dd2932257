//! Full profile decode pipeline: envelope, archive, manifest.

use modview_core::Manifest;
use tracing::debug;

use crate::archive::{create_archive, extract_member, MANIFEST_MEMBER};
use crate::manifest::{parse_manifest, serialize_manifest};
use crate::payload::{decode_payload, encode_payload};
use crate::TransportResult;

/// Decode a raw profile export into its manifest
pub fn decode_profile(raw: &[u8]) -> TransportResult<Manifest> {
    let archive = decode_payload(raw)?;
    decode_archive(&archive)
}

/// Decode the manifest from already-unwrapped archive bytes
pub fn decode_archive(archive: &[u8]) -> TransportResult<Manifest> {
    let member = extract_member(archive, MANIFEST_MEMBER)?;
    let manifest = parse_manifest(&member)?;
    debug!(
        "Decoded profile '{}' with {} mods",
        manifest.profile_name,
        manifest.mods.len()
    );
    Ok(manifest)
}

/// Encode a manifest into a profile export with the given header line
pub fn encode_profile(manifest: &Manifest, header: &str) -> TransportResult<Vec<u8>> {
    let yaml = serialize_manifest(manifest)?;
    let archive = create_archive(&[(MANIFEST_MEMBER, yaml.as_bytes())])?;
    Ok(encode_payload(header, &archive))
}
