//! Decoding and verification of U2F-style hardware token messages.
//!
//! Two binary message shapes matter to the approval workflow: the
//! registration response, which carries the public key and the key handle
//! that becomes an admin's stable identity, and the authentication response,
//! whose signature proves an admin approved a specific proposal. Both are
//! parsed through a bounds-checked cursor; certificate and signature regions
//! are delimited by their DER length framing.
//!
//! All functions here are pure and synchronous. Non-conformant but harmless
//! input (trailing bytes, reserved flag bits) is logged and tolerated,
//! mirroring the lenient posture of token middleware in the wild.

pub mod authenticate;
pub mod base64url;
pub mod cursor;
pub mod der;
pub mod error;
pub mod register;
pub mod verify;

pub use authenticate::AuthenticationResponse;
pub use base64url::{from_websafe_base64, to_websafe_base64};
pub use cursor::ByteCursor;
pub use error::DecodeError;
pub use register::RegistrationResponse;
pub use verify::{verify_signature, verify_signature_pem};
