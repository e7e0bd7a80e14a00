//! Low-level protobuf wire format primitives.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields, map entries)
//! - 5: I32 (fixed32, sfixed32, float)
//!
//! Wire types 3 and 4 (groups) are rejected as malformed.

mod cursor;
mod varint;
mod writer;

use crate::error::{Error, Result};
use std::fmt;
use tracing::trace;

pub use cursor::Cursor;
pub use varint::{decode_varint, encode_varint, encoded_len, MAX_VARINT_LEN};
pub use writer::Writer;

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width, little-endian
    Fixed64 = 1,
    /// Varint length followed by that many bytes
    LengthDelimited = 2,
    /// 32-bit fixed-width, little-endian
    Fixed32 = 5,
}

impl WireType {
    /// Converts the low three tag bits to a wire type
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// Returns the payload width for fixed-width wire types
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            WireType::Fixed32 => Some(4),
            WireType::Fixed64 => Some(8),
            WireType::Varint | WireType::LengthDelimited => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "VARINT",
            WireType::Fixed64 => "I64",
            WireType::LengthDelimited => "LEN",
            WireType::Fixed32 => "I32",
        };
        f.write_str(name)
    }
}

/// Field header: field number and wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    /// Field number, 1..=2^29-1
    pub field_number: u32,
    /// Payload layout
    pub wire_type: WireType,
}

impl FieldTag {
    /// Creates a new field tag
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type,
        }
    }

    /// Packs the tag as `(field_number << 3) | wire_type`
    pub fn encode(&self) -> u32 {
        (self.field_number << 3) | self.wire_type as u32
    }

    /// Unpacks a raw tag value
    ///
    /// Returns `None` for group or reserved wire types and for field numbers
    /// outside `1..=MAX_FIELD_NUMBER`.
    pub fn decode(raw: u64) -> Option<Self> {
        let wire_type = WireType::from_bits((raw & 0x07) as u8)?;
        let field_number = raw >> 3;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return None;
        }
        Some(Self {
            field_number: field_number as u32,
            wire_type,
        })
    }
}

/// Writes a field header
pub fn encode_header(writer: &mut Writer, field_number: u32, wire_type: WireType) {
    writer.write_varint(u64::from(FieldTag::new(field_number, wire_type).encode()));
}

/// Reads a field header
///
/// An illegal wire type or field number is a [`Error::MalformedHeader`]; the
/// position of everything after it cannot be trusted.
pub fn decode_header(cursor: &mut Cursor<'_>) -> Result<FieldTag> {
    let offset = cursor.position();
    let raw = cursor.read_varint()?;
    FieldTag::decode(raw).ok_or_else(|| {
        Error::malformed_header(offset, raw >> 3, (raw & 0x07) as u8)
    })
}

/// Consumes one field payload of the given wire type without decoding it.
///
/// Returns the number of bytes skipped.
pub fn skip_field(cursor: &mut Cursor<'_>, wire_type: WireType) -> Result<usize> {
    let start = cursor.position();
    match wire_type {
        WireType::Varint => {
            cursor.read_varint()?;
        }
        WireType::Fixed32 | WireType::Fixed64 => {
            let width = wire_type.fixed_width().unwrap_or_default();
            cursor.advance(width)?;
        }
        WireType::LengthDelimited => {
            let length = cursor.read_length()?;
            cursor.advance(length)?;
        }
    }
    let skipped = cursor.position() - start;
    trace!("skipped {} payload bytes of wire type {}", skipped, wire_type);
    Ok(skipped)
}

/// ZigZag-encodes a signed 32-bit integer
#[inline]
pub fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// ZigZag-encodes a signed 64-bit integer
#[inline]
pub fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Reverses [`zigzag_encode_32`]
#[inline]
pub fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

/// Reverses [`zigzag_encode_64`]
#[inline]
pub fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}
