//! Web-safe base64 helpers.
//!
//! Token key handles travel as unpadded web-safe base64 and become the
//! stable admin identifier. Inbound payloads may arrive in either alphabet
//! depending on the client, so decoding is lenient.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;

use crate::error::DecodeError;

/// Encodes bytes as unpadded web-safe base64.
pub fn to_websafe_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64 in either alphabet, padded or not.
pub fn from_websafe_base64(input: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| URL_SAFE.decode(input))
        .or_else(|_| STANDARD.decode(input))
        .or_else(|_| STANDARD_NO_PAD.decode(input))
        .map_err(|_| DecodeError::MalformedBase64)
}
