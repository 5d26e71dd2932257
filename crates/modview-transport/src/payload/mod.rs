//! Single-file transport envelope
//!
//! The registry serves an exported profile as `<header>\n<base64 body>`.
//! Decoding is forgiving in the same places a browser's `atob` is: ASCII
//! whitespace inside the body is ignored and padding is optional.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use modview_core::error::ModviewError;

use crate::TransportResult;

/// Header line written in front of exported profiles
pub const PROFILE_HEADER: &str = "#r2modman";

const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Strip the header line and decode the base64 body into archive bytes
pub fn decode_payload(raw: &[u8]) -> TransportResult<Vec<u8>> {
    let newline = raw
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| ModviewError::MalformedTransport {
            reason: "Invalid data format: missing header line".to_string(),
        })?;

    let body: Vec<u8> = raw[newline + 1..]
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    FORGIVING
        .decode(&body)
        .map_err(|e| ModviewError::MalformedTransport {
            reason: format!("body is not valid base64: {}", e),
        })
}

/// Wrap archive bytes into the transport envelope
pub fn encode_payload(header: &str, archive: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + 1 + archive.len() * 4 / 3 + 4);
    out.extend_from_slice(header.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(FORGIVING.encode(archive).as_bytes());
    out
}
