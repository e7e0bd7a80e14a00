//! Schema-less decoding for inspecting wire data.
//!
//! Without a descriptor the meaning of a payload is a guess: varints are
//! shown unsigned, fixed-width values as hex, and a length-delimited payload
//! is shown as a nested message when it parses completely as one, otherwise
//! as a string or raw bytes.

use crate::error::Result;
use crate::wire::{decode_header, Cursor, WireType};
use bytes::Bytes;
use std::fmt;
use tracing::trace;

/// Raw payload of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Varint payload
    Varint(u64),
    /// 32-bit payload
    Fixed32(u32),
    /// 64-bit payload
    Fixed64(u64),
    /// Length-delimited payload that is not a message
    Bytes(Bytes),
    /// Length-delimited payload that parsed as a message
    Message(RawMessage),
}

/// One decoded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Field number
    pub number: u32,
    /// Wire type the field arrived with
    pub wire_type: WireType,
    /// Payload
    pub value: RawValue,
}

/// Fields of one message, in wire order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    /// Decoded fields
    pub fields: Vec<RawField>,
}

impl RawMessage {
    /// Number of fields, counting those in nested messages
    pub fn total_fields(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.value {
                RawValue::Message(nested) => 1 + nested.total_fields(),
                _ => 1,
            })
            .sum()
    }

    /// Deepest message nesting below this one
    pub fn depth(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|field| match &field.value {
                RawValue::Message(nested) => Some(1 + nested.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        for field in &self.fields {
            match &field.value {
                RawValue::Varint(v) => writeln!(f, "{}{}: {}", pad, field.number, v)?,
                RawValue::Fixed32(v) => writeln!(f, "{}{}: 0x{:08x}", pad, field.number, v)?,
                RawValue::Fixed64(v) => writeln!(f, "{}{}: 0x{:016x}", pad, field.number, v)?,
                RawValue::Bytes(b) => {
                    writeln!(f, "{}{}: \"{}\"", pad, field.number, escape(b))?
                }
                RawValue::Message(nested) => {
                    writeln!(f, "{}{} {{", pad, field.number)?;
                    nested.write_tree(f, indent + 1)?;
                    writeln!(f, "{}}}", pad)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

fn escape(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.chars().any(char::is_control) => text.escape_default().to_string(),
        _ => bytes
            .iter()
            .flat_map(|b| std::ascii::escape_default(*b))
            .map(char::from)
            .collect(),
    }
}

/// Decodes `data` without a schema
///
/// Length-delimited payloads are tried as nested messages down to
/// `max_depth` levels.
pub fn decode_raw(data: &[u8], max_depth: usize) -> Result<RawMessage> {
    let mut cursor = Cursor::new(data);
    decode_fields(&mut cursor, max_depth)
}

fn decode_fields(cursor: &mut Cursor<'_>, depth_left: usize) -> Result<RawMessage> {
    let mut fields = Vec::new();
    while !cursor.is_exhausted() {
        let tag = decode_header(cursor)?;
        let value = match tag.wire_type {
            WireType::Varint => RawValue::Varint(cursor.read_varint()?),
            WireType::Fixed32 => RawValue::Fixed32(u32::from_le_bytes(cursor.read_array()?)),
            WireType::Fixed64 => RawValue::Fixed64(u64::from_le_bytes(cursor.read_array()?)),
            WireType::LengthDelimited => {
                let payload = cursor.read_length_delimited()?;
                guess_payload(payload, depth_left)
            }
        };
        fields.push(RawField {
            number: tag.field_number,
            wire_type: tag.wire_type,
            value,
        });
    }
    Ok(RawMessage { fields })
}

fn guess_payload(payload: &[u8], depth_left: usize) -> RawValue {
    if depth_left > 0 && !payload.is_empty() {
        if let Ok(nested) = decode_fields(&mut Cursor::new(payload), depth_left - 1) {
            return RawValue::Message(nested);
        }
        trace!("{} byte payload is not a message", payload.len());
    }
    RawValue::Bytes(Bytes::copy_from_slice(payload))
}
