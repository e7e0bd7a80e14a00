//! Growable output buffer for wire-format bytes.

use super::{encode_header, encode_varint, WireType};
use bytes::{BufMut, Bytes, BytesMut};

const INITIAL_CAPACITY: usize = 64;

/// Writer appends wire-format primitives to an owned buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buffer: BytesMut,
}

impl Writer {
    /// Creates a new writer with default capacity
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates a new writer with the specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length of the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the encoded bytes as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns the encoded bytes
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Writes a field header
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) {
        encode_header(self, field_number, wire_type);
    }

    /// Writes an unsigned varint
    pub fn write_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buffer);
    }

    /// Writes a little-endian 32-bit value
    pub fn write_fixed32(&mut self, value: u32) {
        self.buffer.put_u32_le(value);
    }

    /// Writes a little-endian 64-bit value
    pub fn write_fixed64(&mut self, value: u64) {
        self.buffer.put_u64_le(value);
    }

    /// Writes an IEEE-754 single in its little-endian layout
    pub fn write_float(&mut self, value: f32) {
        self.buffer.put_f32_le(value);
    }

    /// Writes an IEEE-754 double in its little-endian layout
    pub fn write_double(&mut self, value: f64) {
        self.buffer.put_f64_le(value);
    }

    /// Writes raw bytes with no prefix
    pub fn write_raw(&mut self, data: &[u8]) {
        self.buffer.put_slice(data);
    }

    /// Writes a varint length followed by the bytes
    pub fn write_length_delimited(&mut self, data: &[u8]) {
        self.write_varint(data.len() as u64);
        self.buffer.put_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_fixed_layouts() {
        let mut writer = Writer::new();
        writer.write_fixed32(10);
        writer.write_float(0.1);
        writer.write_double(0.1);
        assert_eq!(
            writer.as_bytes(),
            &[
                0x0a, 0x00, 0x00, 0x00, // fixed32
                0xcd, 0xcc, 0xcc, 0x3d, // float
                0x9a, 0x99, 0x99, 0x99, 0x99, 0x99, 0xb9, 0x3f, // double
            ]
        );
    }

    #[test]
    fn test_write_length_delimited() {
        let mut writer = Writer::new();
        writer.write_tag(6, WireType::LengthDelimited);
        writer.write_length_delimited(b"qwerty");
        assert_eq!(writer.freeze().as_ref(), b"\x32\x06qwerty");
    }

    #[test]
    fn test_write_empty_length_delimited() {
        let mut writer = Writer::new();
        writer.write_length_delimited(b"");
        assert_eq!(writer.as_bytes(), &[0x00]);
    }
}
