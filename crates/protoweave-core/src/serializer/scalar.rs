//! Scalar and enum handlers.

use super::registry::SerializationHandler;
use crate::error::{Error, Result};
use crate::schema::ScalarType;
use crate::value::Value;
use crate::wire::{
    zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64, Cursor, FieldTag,
    WireType, Writer,
};
use bytes::Bytes;

/// Fails unless the field arrived with the wire type `expected`
pub(crate) fn expect_wire_type(tag: FieldTag, expected: WireType) -> Result<()> {
    if tag.wire_type != expected {
        return Err(Error::wire_type_mismatch(
            tag.field_number,
            expected,
            tag.wire_type,
        ));
    }
    Ok(())
}

/// Writes the payload of one scalar, without a header
pub(crate) fn encode_scalar(scalar: ScalarType, value: &Value, writer: &mut Writer) -> Result<()> {
    match (scalar, value) {
        // Negative int32 is sign-extended to the full 10-byte form
        (ScalarType::Int32, Value::Int32(v)) => writer.write_varint(i64::from(*v) as u64),
        (ScalarType::Int64, Value::Int64(v)) => writer.write_varint(*v as u64),
        (ScalarType::UInt32, Value::UInt32(v)) => writer.write_varint(u64::from(*v)),
        (ScalarType::UInt64, Value::UInt64(v)) => writer.write_varint(*v),
        (ScalarType::SInt32, Value::SInt32(v)) => {
            writer.write_varint(u64::from(zigzag_encode_32(*v)))
        }
        (ScalarType::SInt64, Value::SInt64(v)) => writer.write_varint(zigzag_encode_64(*v)),
        (ScalarType::Fixed32, Value::Fixed32(v)) => writer.write_fixed32(*v),
        (ScalarType::Fixed64, Value::Fixed64(v)) => writer.write_fixed64(*v),
        (ScalarType::SFixed32, Value::SFixed32(v)) => writer.write_fixed32(*v as u32),
        (ScalarType::SFixed64, Value::SFixed64(v)) => writer.write_fixed64(*v as u64),
        (ScalarType::Float, Value::Float(v)) => writer.write_float(*v),
        (ScalarType::Double, Value::Double(v)) => writer.write_double(*v),
        (ScalarType::Bool, Value::Bool(v)) => writer.write_varint(u64::from(*v)),
        (ScalarType::String, Value::String(v)) => writer.write_length_delimited(v.as_bytes()),
        (ScalarType::Bytes, Value::Bytes(v)) => writer.write_length_delimited(v),
        (scalar, other) => return Err(Error::type_mismatch(scalar, other.kind_name())),
    }
    Ok(())
}

/// Reads the payload of one scalar
///
/// 32-bit varint types keep the low 32 bits, which accepts both the 10-byte
/// and the 5-byte encodings of a negative value.
pub(crate) fn decode_scalar(scalar: ScalarType, cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(match scalar {
        ScalarType::Int32 => Value::Int32(cursor.read_varint()? as i32),
        ScalarType::Int64 => Value::Int64(cursor.read_varint()? as i64),
        ScalarType::UInt32 => Value::UInt32(cursor.read_varint()? as u32),
        ScalarType::UInt64 => Value::UInt64(cursor.read_varint()?),
        ScalarType::SInt32 => Value::SInt32(zigzag_decode_32(cursor.read_varint()? as u32)),
        ScalarType::SInt64 => Value::SInt64(zigzag_decode_64(cursor.read_varint()?)),
        ScalarType::Fixed32 => Value::Fixed32(u32::from_le_bytes(cursor.read_array()?)),
        ScalarType::Fixed64 => Value::Fixed64(u64::from_le_bytes(cursor.read_array()?)),
        ScalarType::SFixed32 => Value::SFixed32(i32::from_le_bytes(cursor.read_array()?)),
        ScalarType::SFixed64 => Value::SFixed64(i64::from_le_bytes(cursor.read_array()?)),
        ScalarType::Float => Value::Float(f32::from_le_bytes(cursor.read_array()?)),
        ScalarType::Double => Value::Double(f64::from_le_bytes(cursor.read_array()?)),
        ScalarType::Bool => Value::Bool(cursor.read_varint()? != 0),
        ScalarType::String => {
            let offset = cursor.position();
            let bytes = cursor.read_length_delimited()?;
            let text = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { offset })?;
            Value::String(text.to_owned())
        }
        ScalarType::Bytes => Value::Bytes(Bytes::copy_from_slice(cursor.read_length_delimited()?)),
    })
}

/// Writes an enum ordinal as a sign-extended varint
pub(crate) fn encode_enum(name: &str, value: &Value, writer: &mut Writer) -> Result<()> {
    match value {
        Value::Enum(v) => {
            writer.write_varint(i64::from(*v) as u64);
            Ok(())
        }
        other => Err(Error::type_mismatch(
            format!("enum {}", name),
            other.kind_name(),
        )),
    }
}

/// Reads an enum ordinal
pub(crate) fn decode_enum(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Enum(cursor.read_varint()? as i32))
}

/// Handler for a singular scalar field
pub(crate) fn scalar_handler(scalar: ScalarType) -> SerializationHandler {
    SerializationHandler::new(
        move |ctx, value, field_number| {
            let mut writer = Writer::new();
            encode_scalar(scalar, value, &mut writer)?;
            if ctx.config().omit_defaults && value.is_default() {
                *field_number = None;
                return Ok(Bytes::new());
            }
            Ok(writer.freeze())
        },
        move |_ctx, cursor, tag, value| {
            expect_wire_type(tag, scalar.wire_type())?;
            *value = decode_scalar(scalar, cursor)?;
            Ok(())
        },
        Some(scalar.wire_type()),
    )
}

/// Handler for a singular enum field
pub(crate) fn enum_handler(name: String) -> SerializationHandler {
    SerializationHandler::new(
        move |ctx, value, field_number| {
            let mut writer = Writer::new();
            encode_enum(&name, value, &mut writer)?;
            if ctx.config().omit_defaults && value.is_default() {
                *field_number = None;
                return Ok(Bytes::new());
            }
            Ok(writer.freeze())
        },
        |_ctx, cursor, tag, value| {
            expect_wire_type(tag, WireType::Varint)?;
            *value = decode_enum(cursor)?;
            Ok(())
        },
        Some(WireType::Varint),
    )
}
