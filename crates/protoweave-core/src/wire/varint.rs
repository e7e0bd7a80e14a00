//! Base-128 varint encoding.

use super::Cursor;
use crate::error::Result;
use bytes::BufMut;

/// Maximum number of bytes for a varint-encoded u64.
/// Each byte carries 7 bits, so ceil(64/7) = 10 bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends `value` as a varint: low 7-bit group first, continuation bit set
/// on every byte but the last. Zero encodes as the single byte `0x00`.
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value > 0x7f {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes [`encode_varint`] emits for `value`
pub fn encoded_len(value: u64) -> usize {
    // Bits needed, rounded up to 7-bit groups; zero still takes one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Decode a varint from the start of the given bytes.
///
/// Returns the decoded value and the number of bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut cursor = Cursor::new(data);
    let value = cursor.read_varint()?;
    Ok((value, cursor.position()))
}
