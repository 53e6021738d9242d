//! ASN.1 DER length framing.
//!
//! The registration and authentication payloads embed an attestation
//! certificate and ECDSA signatures as DER elements. Only the length framing
//! is decoded here; the content is delimited and either skipped or handed
//! out verbatim.

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// Decodes a single DER length field and advances the cursor past it.
///
/// Short form (first octet <= 0x7f) is the length itself. Long form uses the
/// low 7 bits of the first octet as the count of following big-endian length
/// bytes. `0x80` (indefinite) and `0xff` are reserved and never produced by
/// DER.
pub fn read_length(cur: &mut ByteCursor<'_>) -> Result<usize, DecodeError> {
    let first = cur.take_u8()?;

    if first & 0x80 == 0 {
        return Ok(first as usize);
    }

    let count = (first & 0x7f) as usize;
    if count == 0 {
        return Err(DecodeError::MalformedLength(
            "indefinite length is not valid DER",
        ));
    }
    if first == 0xff {
        return Err(DecodeError::MalformedLength("reserved length octet 0xff"));
    }
    if count > core::mem::size_of::<usize>() {
        return Err(DecodeError::MalformedLength(
            "long-form length wider than usize",
        ));
    }
    if count > cur.remaining() {
        return Err(DecodeError::MalformedLength(
            "long-form length runs past end of buffer",
        ));
    }

    let mut value = 0usize;
    for &byte in cur.take(count)? {
        value = (value << 8) | byte as usize;
    }
    Ok(value)
}

/// Consumes one whole TLV element (tag, length field, content) and returns
/// its full span.
pub fn take_element<'a>(cur: &mut ByteCursor<'a>) -> Result<&'a [u8], DecodeError> {
    let start = cur.rest();
    let before = cur.position();

    let _tag = cur.take_u8()?;
    let content_len = read_length(cur)?;
    cur.take(content_len)?;

    let total = cur.position() - before;
    Ok(&start[..total])
}
