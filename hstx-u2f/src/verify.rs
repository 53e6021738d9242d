//! Approval signature verification.
//!
//! ECDSA over P-256 with SHA-256, checked against the raw signature-base
//! bytes. A signature that parses but does not verify is a rejection
//! (`Ok(false)`), never an error; only unparseable material errors out.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;

use crate::error::DecodeError;

/// Verifies a DER-encoded signature over the signature base with an
/// uncompressed SEC1 public key.
pub fn verify_signature(
    signature_base: &[u8],
    signature_der: &[u8],
    public_key_sec1: &[u8],
) -> Result<bool, DecodeError> {
    let key = VerifyingKey::from_sec1_bytes(public_key_sec1)
        .map_err(|_| DecodeError::MalformedPublicKey)?;
    verify_with_key(signature_base, signature_der, &key)
}

/// Same check, with the key in the SPKI PEM form stored on admin records.
pub fn verify_signature_pem(
    signature_base: &[u8],
    signature_der: &[u8],
    public_key_pem: &str,
) -> Result<bool, DecodeError> {
    let key = VerifyingKey::from_public_key_pem(public_key_pem)
        .map_err(|_| DecodeError::MalformedPublicKey)?;
    verify_with_key(signature_base, signature_der, &key)
}

fn verify_with_key(
    signature_base: &[u8],
    signature_der: &[u8],
    key: &VerifyingKey,
) -> Result<bool, DecodeError> {
    let signature =
        Signature::from_der(signature_der).map_err(|_| DecodeError::MalformedSignature)?;
    Ok(key.verify(signature_base, &signature).is_ok())
}
