//! U2F authentication message decoding.
//!
//! Layout:
//!
//! ```text
//! flags[1] | counter[4, big-endian] | ECDSA signature (DER)
//! ```
//!
//! The signature base reconstructed here is the exact byte string the token
//! signed; verification fails unless it matches bit for bit.

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::cursor::ByteCursor;
use crate::der;
use crate::error::DecodeError;

/// Bit 0 of the flags byte: user presence was verified by the token.
pub const FLAG_USER_PRESENCE: u8 = 0x01;

/// Decoded U2F authentication response, plus the signature base derived
/// from it and the request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// Raw flags byte; bits 1-7 are reserved.
    pub user_presence: u8,

    /// Anti-replay counter maintained by the token.
    pub counter: u32,

    /// DER-encoded ECDSA signature, full element span.
    pub signature: Vec<u8>,

    /// `SHA256(app_id) || flags || counter_be || SHA256(client_data)`.
    pub signature_base: Vec<u8>,
}

impl AuthenticationResponse {
    /// Parses a raw authentication response and builds the signature base
    /// for the given application identifier and client data.
    pub fn decode(raw: &[u8], app_id: &str, client_data: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(raw);

        let user_presence = cur.take_u8()?;
        if user_presence & !FLAG_USER_PRESENCE != 0 {
            warn!("authentication flags have reserved bits set: {user_presence:#04x}");
        }

        let counter_bytes: [u8; 4] = cur
            .take(4)?
            .try_into()
            .map_err(|_| DecodeError::TruncatedBuffer {
                needed: 4,
                remaining: 0,
            })?;
        let counter = u32::from_be_bytes(counter_bytes);

        let signature = der::take_element(&mut cur)?.to_vec();

        if !cur.is_empty() {
            warn!(
                "authentication data has trailing bytes: {}",
                hex::encode(cur.rest())
            );
        }

        let mut signature_base =
            Vec::with_capacity(Sha256::output_size() * 2 + 1 + counter_bytes.len());
        signature_base.extend_from_slice(&Sha256::digest(app_id.as_bytes()));
        signature_base.push(user_presence);
        signature_base.extend_from_slice(&counter_bytes);
        signature_base.extend_from_slice(&Sha256::digest(client_data));

        Ok(Self {
            user_presence,
            counter,
            signature,
            signature_base,
        })
    }

    /// Whether the token reported a user-presence check.
    pub fn presence_verified(&self) -> bool {
        self.user_presence & FLAG_USER_PRESENCE != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_authentication(flags: u8, counter: u32, trailing: &[u8]) -> Vec<u8> {
        let mut raw = vec![flags];
        raw.extend_from_slice(&counter.to_be_bytes());
        // Dummy DER signature: SEQUENCE with 6 content bytes.
        raw.extend_from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        raw.extend_from_slice(trailing);
        raw
    }

    #[test]
    fn decodes_flags_counter_and_signature() {
        let raw = build_authentication(FLAG_USER_PRESENCE, 0x01020304, &[]);
        let auth = AuthenticationResponse::decode(&raw, "https://example.org", b"{}").unwrap();

        assert!(auth.presence_verified());
        assert_eq!(auth.counter, 0x01020304);
        assert_eq!(
            auth.signature,
            &[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn signature_base_is_byte_exact() {
        let app_id = "https://example.org";
        let client_data = br#"{"typ":"navigator.id.getAssertion"}"#;
        let raw = build_authentication(FLAG_USER_PRESENCE, 7, &[]);

        let auth = AuthenticationResponse::decode(&raw, app_id, client_data).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&Sha256::digest(app_id.as_bytes()));
        expected.push(FLAG_USER_PRESENCE);
        expected.extend_from_slice(&7u32.to_be_bytes());
        expected.extend_from_slice(&Sha256::digest(client_data));

        assert_eq!(auth.signature_base, expected);
        assert_eq!(auth.signature_base.len(), 32 + 1 + 4 + 32);
    }

    #[test]
    fn reserved_bits_do_not_block_decoding() {
        let raw = build_authentication(0x81, 1, &[]);
        let auth = AuthenticationResponse::decode(&raw, "app", b"data").unwrap();
        assert!(auth.presence_verified());
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let raw = build_authentication(FLAG_USER_PRESENCE, 1, &[0xff]);
        assert!(AuthenticationResponse::decode(&raw, "app", b"data").is_ok());
    }

    #[test]
    fn fewer_than_five_bytes_is_truncation() {
        let raw = [FLAG_USER_PRESENCE, 0x00, 0x00];
        assert!(matches!(
            AuthenticationResponse::decode(&raw, "app", b"data"),
            Err(DecodeError::TruncatedBuffer { .. })
        ));
    }
}
