//! Embedded message handler.

use super::registry::SerializationHandler;
use super::scalar::expect_wire_type;
use super::Context;
use crate::error::{Error, Result};
use crate::message::DynamicMessage;
use crate::value::Value;
use crate::wire::{Cursor, WireType, Writer};
use bytes::Bytes;
use std::sync::Arc;

/// Writes `value` as a length-prefixed message of type `name`
pub(crate) fn write_message(
    ctx: &Context<'_>,
    name: &str,
    value: &Value,
    writer: &mut Writer,
) -> Result<()> {
    let message = match value {
        Value::Message(message) if message.descriptor_arc().name() == name => message,
        Value::Message(message) => {
            return Err(Error::type_mismatch(
                format!("message {}", name),
                format!("message {}", message.descriptor_arc().name()),
            ))
        }
        other => {
            return Err(Error::type_mismatch(
                format!("message {}", name),
                other.kind_name(),
            ))
        }
    };
    let payload = ctx.nested()?.serialize_message(message.as_ref())?;
    writer.write_length_delimited(&payload);
    Ok(())
}

/// Reads a length-prefixed message of type `name` into `value`
///
/// An existing message in `value` is merged into: singular fields are
/// overwritten, lists are appended to and map entries inserted.
pub(crate) fn read_message(
    ctx: &Context<'_>,
    name: &str,
    cursor: &mut Cursor<'_>,
    value: &mut Value,
) -> Result<()> {
    let mut payload = cursor.length_delimited_cursor()?;
    if !matches!(value, Value::Message(_)) {
        let descriptor = Arc::clone(ctx.registry().descriptor(name)?);
        *value = Value::from(DynamicMessage::new(descriptor));
    }
    match value {
        Value::Message(message) if message.descriptor_arc().name() == name => {
            ctx.nested()?.deserialize_message(message.as_mut(), &mut payload)
        }
        Value::Message(message) => Err(Error::type_mismatch(
            format!("message {}", name),
            format!("message {}", message.descriptor_arc().name()),
        )),
        other => Err(Error::type_mismatch(
            format!("message {}", name),
            other.kind_name(),
        )),
    }
}

/// Handler for a singular embedded message field
pub(crate) fn message_handler(name: String) -> SerializationHandler {
    let read_name = name.clone();
    SerializationHandler::new(
        move |ctx, value, field_number| {
            if value.is_null() {
                *field_number = None;
                return Ok(Bytes::new());
            }
            let mut writer = Writer::new();
            write_message(ctx, &name, value, &mut writer)?;
            Ok(writer.freeze())
        },
        move |ctx, cursor, tag, value| {
            expect_wire_type(tag, WireType::LengthDelimited)?;
            read_message(ctx, &read_name, cursor, value)
        },
        Some(WireType::LengthDelimited),
    )
}
