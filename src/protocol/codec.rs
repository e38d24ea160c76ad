//! Byte codec
//!
//! Conversions between 32-bit integers and their big-endian wire form.
//! Every multi-byte field in both the primary protocol and the proxy
//! handshake goes through these helpers.

use bytes::{BufMut, BytesMut};

/// Size of every integer field on the wire
pub const INT_SIZE: usize = 4;

/// Encode an i32 as 4 big-endian bytes
#[inline]
pub fn encode_i32_be(value: i32) -> [u8; INT_SIZE] {
    value.to_be_bytes()
}

/// Decode 4 big-endian bytes into an i32
#[inline]
pub fn decode_i32_be(bytes: [u8; INT_SIZE]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Decode the big-endian i32 at `offset`
///
/// Panics if `buf` holds fewer than `offset + 4` bytes; callers check sizes
/// before reaching here.
#[inline]
pub(crate) fn read_i32_at(buf: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; INT_SIZE];
    raw.copy_from_slice(&buf[offset..offset + INT_SIZE]);
    decode_i32_be(raw)
}

/// Append a length-prefixed segment: 4-byte length, then the bytes
///
/// Segment lengths are bounded by the key limits or the maximum body size,
/// both far below `i32::MAX`.
pub fn put_segment(buf: &mut BytesMut, segment: &[u8]) {
    put_len(buf, segment.len());
    buf.put_slice(segment);
}

/// Append a bare 4-byte length prefix
pub fn put_len(buf: &mut BytesMut, len: usize) {
    buf.put_slice(&encode_i32_be(len as i32));
}
