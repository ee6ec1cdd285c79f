//! Unverified decoding of compact three-segment tokens

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde_json::Value;

use super::claims::Claims;

/// base64url that accepts segments with or without `=` padding
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Whether the token has the compact `header.payload.signature` shape
pub fn is_well_formed(token: &str) -> bool {
    let mut segments = token.split('.');
    let header = segments.next();
    let payload = segments.next();
    let signature = segments.next();

    matches!((header, payload, signature), (Some(h), Some(p), Some(_)) if !h.is_empty() && !p.is_empty())
        && segments.next().is_none()
}

/// Decode the claims payload of a token without verifying its signature.
///
/// Returns `None` for anything that is not a three-segment token whose middle
/// segment is base64url-encoded JSON object.
pub fn decode(token: &str) -> Option<Claims> {
    if !is_well_formed(token) {
        return None;
    }

    let payload = token.split('.').nth(1)?;
    let bytes = SEGMENT_ENGINE.decode(payload).ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(Claims::new(map)),
        _ => None,
    }
}

/// Absolute expiry of a token in milliseconds.
///
/// Prefers the token's own `exp` claim and falls back to an expiry recorded
/// when the token was stored. `None` means no expiry could be determined.
pub fn expiry_ms(token: &str, fallback_ms: Option<i64>) -> Option<i64> {
    decode(token)
        .and_then(|claims| claims.expires_at_ms())
        .or(fallback_ms)
}
