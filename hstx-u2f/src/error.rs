use thiserror::Error;

/// Errors raised while decoding or verifying U2F token messages.
///
/// Decode errors are terminal for the single message being parsed; nothing
/// partially decoded is ever handed to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A fixed-size read ran past the end of the buffer.
    #[error("truncated buffer: needed {needed} byte(s), {remaining} remaining")]
    TruncatedBuffer { needed: usize, remaining: usize },

    /// A DER length field used a reserved encoding or declared more bytes
    /// than the buffer holds.
    #[error("malformed DER length: {0}")]
    MalformedLength(&'static str),

    /// Signature bytes do not parse as a DER-encoded ECDSA (r, s) pair.
    #[error("malformed signature: not valid DER-encoded ECDSA")]
    MalformedSignature,

    /// The registered public key is not a valid uncompressed P-256 point.
    #[error("malformed public key: not a valid P-256 SEC1 point")]
    MalformedPublicKey,

    /// Base64 input at the message boundary could not be decoded.
    #[error("malformed base64 input")]
    MalformedBase64,
}
