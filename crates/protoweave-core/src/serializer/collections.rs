//! Repeated field and map handlers.
//!
//! Packable element kinds (numeric scalars, bools and enums) are written as
//! one length-delimited run when packing is enabled. Strings, bytes and
//! messages are always written one tagged field per element. Decoding
//! accepts either layout for packable kinds.

use super::registry::SerializationHandler;
use super::scalar::{decode_enum, decode_scalar, encode_enum, encode_scalar, expect_wire_type};
use super::{nested, Context};
use crate::error::{Error, Result};
use crate::schema::{ElementKind, FieldKind, ScalarType};
use crate::value::{MapKey, Value};
use crate::wire::{decode_header, skip_field, Cursor, WireType, Writer};
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const MAP_KEY_FIELD: u32 = 1;
const MAP_VALUE_FIELD: u32 = 2;

fn encode_element(
    ctx: &Context<'_>,
    element: &ElementKind,
    value: &Value,
    writer: &mut Writer,
) -> Result<()> {
    match element {
        ElementKind::Scalar(scalar) => encode_scalar(*scalar, value, writer),
        ElementKind::Enum(name) => encode_enum(name, value, writer),
        ElementKind::Message(name) => nested::write_message(ctx, name, value, writer),
    }
}

fn decode_element(ctx: &Context<'_>, element: &ElementKind, cursor: &mut Cursor<'_>) -> Result<Value> {
    match element {
        ElementKind::Scalar(scalar) => decode_scalar(*scalar, cursor),
        ElementKind::Enum(_) => decode_enum(cursor),
        ElementKind::Message(name) => {
            let mut value = Value::Null;
            nested::read_message(ctx, name, cursor, &mut value)?;
            Ok(value)
        }
    }
}

fn list_items<'v>(element: &ElementKind, value: &'v Value) -> Result<&'v [Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(Error::type_mismatch(
            FieldKind::List(element.clone()),
            other.kind_name(),
        )),
    }
}

/// Handler for a repeated field of `element`
pub(crate) fn list_handler(element: ElementKind) -> SerializationHandler {
    let read_element = element.clone();
    SerializationHandler::new(
        move |ctx, value, field_number| {
            let items = list_items(&element, value)?;
            if items.is_empty() {
                *field_number = None;
                return Ok(Bytes::new());
            }

            if element.is_packable() && ctx.config().pack_repeated {
                let mut packed = Writer::new();
                for item in items {
                    if item.is_null() {
                        warn!("dropping null element of repeated {}", element);
                        continue;
                    }
                    encode_element(ctx, &element, item, &mut packed)?;
                }
                if packed.is_empty() {
                    *field_number = None;
                    return Ok(Bytes::new());
                }
                let mut writer = Writer::with_capacity(packed.len() + 5);
                writer.write_length_delimited(packed.as_bytes());
                return Ok(writer.freeze());
            }

            // Unpacked: one header per element, written here
            let Some(number) = field_number.take() else {
                return Ok(Bytes::new());
            };
            let mut writer = Writer::new();
            for item in items {
                if item.is_null() {
                    warn!("dropping null element of repeated field {}", number);
                    continue;
                }
                writer.write_tag(number, element.wire_type());
                encode_element(ctx, &element, item, &mut writer)?;
            }
            Ok(writer.freeze())
        },
        move |ctx, cursor, tag, value| {
            if value.is_null() {
                *value = Value::List(Vec::new());
            }
            let items = match value {
                Value::List(items) => items,
                other => {
                    return Err(Error::type_mismatch(
                        FieldKind::List(read_element.clone()),
                        other.kind_name(),
                    ))
                }
            };

            if tag.wire_type == WireType::LengthDelimited && read_element.is_packable() {
                let mut packed = cursor.length_delimited_cursor()?;
                while !packed.is_exhausted() {
                    items.push(decode_element(ctx, &read_element, &mut packed)?);
                }
                return Ok(());
            }

            expect_wire_type(tag, read_element.wire_type())?;
            items.push(decode_element(ctx, &read_element, cursor)?);
            Ok(())
        },
        Some(WireType::LengthDelimited),
    )
}

/// Handler for a map field
///
/// Each entry is a nested message with the key in field 1 and the value in
/// field 2, both written through the registered singular handlers.
pub(crate) fn map_handler(key: ScalarType, value_kind: ElementKind) -> SerializationHandler {
    let map_kind = FieldKind::Map(key, value_kind.clone());
    let read_kind = map_kind.clone();
    let key_kind = FieldKind::Scalar(key);
    let value_kind = FieldKind::from(value_kind);
    let read_key_kind = key_kind.clone();
    let read_value_kind = value_kind.clone();

    SerializationHandler::new(
        move |ctx, value, field_number| {
            let entries = match value {
                Value::Map(entries) => entries,
                other => return Err(Error::type_mismatch(&map_kind, other.kind_name())),
            };
            if entries.is_empty() {
                *field_number = None;
                return Ok(Bytes::new());
            }
            let Some(number) = field_number.take() else {
                return Ok(Bytes::new());
            };

            let mut writer = Writer::new();
            for (entry_key, entry_value) in entries {
                let mut entry = Writer::new();
                ctx.write_field(&mut entry, MAP_KEY_FIELD, &key_kind, &entry_key.to_value())?;
                ctx.write_field(&mut entry, MAP_VALUE_FIELD, &value_kind, entry_value)?;
                writer.write_tag(number, WireType::LengthDelimited);
                writer.write_length_delimited(entry.as_bytes());
            }
            Ok(writer.freeze())
        },
        move |ctx, cursor, tag, value| {
            expect_wire_type(tag, WireType::LengthDelimited)?;
            if value.is_null() {
                *value = Value::Map(BTreeMap::new());
            }
            let entries = match value {
                Value::Map(entries) => entries,
                other => return Err(Error::type_mismatch(&read_kind, other.kind_name())),
            };

            let mut entry = cursor.length_delimited_cursor()?;
            let mut entry_key = ctx.registry().default_value(&read_key_kind)?;
            let mut entry_value = ctx.registry().default_value(&read_value_kind)?;
            while !entry.is_exhausted() {
                let sub = decode_header(&mut entry)?;
                match sub.field_number {
                    MAP_KEY_FIELD => {
                        ctx.deserialize_field(&mut entry, &read_key_kind, sub, &mut entry_key)?
                    }
                    MAP_VALUE_FIELD => {
                        ctx.deserialize_field(&mut entry, &read_value_kind, sub, &mut entry_value)?
                    }
                    other => {
                        debug!("skipping unknown map entry field {}", other);
                        skip_field(&mut entry, sub.wire_type)?;
                    }
                }
            }
            entries.insert(MapKey::try_from(entry_key)?, entry_value);
            Ok(())
        },
        Some(WireType::LengthDelimited),
    )
}
