//! U2F registration message decoding.
//!
//! Layout (fixed offsets, variable tail):
//!
//! ```text
//! 0x05 | pubkey[65] | kh_len | key_handle[kh_len] | attestation cert | signature
//! ```
//!
//! The certificate and signature are DER elements delimited by their own
//! length framing; their content is not interpreted here.

use p256::pkcs8::{EncodePublicKey, LineEnding};
use p256::PublicKey;
use tracing::warn;

use crate::base64url::to_websafe_base64;
use crate::cursor::ByteCursor;
use crate::der;
use crate::error::DecodeError;

/// Version 2 registration marker expected in the first byte.
pub const REGISTRATION_RESERVED: u8 = 0x05;

/// Size of an uncompressed P-256 point: `0x04 || X[32] || Y[32]`.
pub const EC_POINT_LEN: usize = 65;

/// Decoded U2F registration response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResponse {
    /// Stable approver identifier: the key handle, web-safe base64 encoded.
    pub approver_id: String,

    /// Opaque per-registration identifier issued by the token.
    pub key_handle: Vec<u8>,

    /// Uncompressed SEC1 point copied verbatim from the message.
    pub public_key: [u8; EC_POINT_LEN],
}

impl RegistrationResponse {
    /// Parses a raw registration response.
    ///
    /// Surplus bytes after the signature region and an unexpected reserved
    /// marker are logged and tolerated; every other shortfall is a hard
    /// decode error.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = ByteCursor::new(raw);

        let reserved = cur.take_u8()?;
        if reserved != REGISTRATION_RESERVED {
            warn!("registration reserved byte is {reserved:#04x}, expected 0x05");
        }

        let public_key: [u8; EC_POINT_LEN] = cur
            .take(EC_POINT_LEN)?
            .try_into()
            .map_err(|_| DecodeError::TruncatedBuffer {
                needed: EC_POINT_LEN,
                remaining: 0,
            })?;

        let kh_len = cur.take_u8()? as usize;
        let key_handle = cur.take(kh_len)?.to_vec();

        let _certificate = der::take_element(&mut cur)?;
        let _signature = der::take_element(&mut cur)?;

        if !cur.is_empty() {
            warn!(
                "registration data has trailing bytes: {}",
                hex::encode(cur.rest())
            );
        }

        Ok(Self {
            approver_id: to_websafe_base64(&key_handle),
            key_handle,
            public_key,
        })
    }

    /// SPKI PEM encoding of the registered point, the portable form stored
    /// on the admin record.
    pub fn public_key_pem(&self) -> Result<String, DecodeError> {
        let key = PublicKey::from_sec1_bytes(&self.public_key)
            .map_err(|_| DecodeError::MalformedPublicKey)?;
        key.to_public_key_pem(LineEnding::LF)
            .map_err(|_| DecodeError::MalformedPublicKey)
    }
}
