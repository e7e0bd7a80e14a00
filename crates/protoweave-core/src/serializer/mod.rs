//! Message serialization driven by a handler registry.
//!
//! ## Overview
//!
//! A [`Serializer`] owns a [`Registry`] of per-kind handlers and a
//! [`SerializerConfig`]. Serializing walks a message's descriptor in slot
//! order, asks the registry for the handler of each field's kind and
//! prefixes the payload with a field header. Deserializing walks headers
//! until the input is exhausted, dispatching known fields to their handler
//! and skipping unknown ones.
//!
//! ```
//! use protoweave_core::schema::{MessageDescriptor, ScalarType};
//! use protoweave_core::serializer::{Registry, Serializer};
//! use protoweave_core::{DynamicMessage, Value};
//!
//! let descriptor = MessageDescriptor::builder("example.Point")
//!     .field(1, "x", ScalarType::SInt32)
//!     .field(2, "y", ScalarType::SInt32)
//!     .build()?;
//!
//! let mut registry = Registry::new();
//! registry.register_message(descriptor.clone())?;
//! let serializer = Serializer::new(registry);
//!
//! let point = DynamicMessage::new(descriptor)
//!     .with("x", Value::SInt32(-1))?
//!     .with("y", Value::SInt32(2))?;
//! let bytes = serializer.serialize(&point)?;
//! assert_eq!(bytes.as_ref(), &[0x08, 0x01, 0x10, 0x04]);
//!
//! let decoded = serializer.decode("example.Point", &bytes)?;
//! assert_eq!(decoded, point);
//! # Ok::<(), protoweave_core::Error>(())
//! ```

mod collections;
mod nested;
mod registry;
mod scalar;

use crate::error::{Error, Result};
use crate::message::{DynamicMessage, Message};
use crate::schema::FieldKind;
use crate::value::Value;
use crate::wire::{decode_header, skip_field, Cursor, FieldTag, Writer, MAX_FIELD_NUMBER};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub use registry::{DeserializeFn, Registry, SerializationHandler, SerializeFn};

/// Configuration for the serializer
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Maximum embedded message depth in either direction
    pub recursion_limit: usize,
    /// Skip singular scalar and enum fields holding their default value
    pub omit_defaults: bool,
    /// Write packable repeated fields packed
    pub pack_repeated: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 100,
            omit_defaults: true,
            pack_repeated: true,
        }
    }
}

impl SerializerConfig {
    /// Creates a new serializer config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum message nesting depth
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Sets whether default-valued singular fields are skipped
    pub fn omit_defaults(mut self, omit: bool) -> Self {
        self.omit_defaults = omit;
        self
    }

    /// Sets whether packable repeated fields are written packed
    pub fn pack_repeated(mut self, pack: bool) -> Self {
        self.pack_repeated = pack;
        self
    }
}

/// State threaded through every handler call
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    registry: &'a Registry,
    config: &'a SerializerConfig,
    depth: usize,
}

impl<'a> Context<'a> {
    /// Handler registry in use
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &'a SerializerConfig {
        self.config
    }

    /// Current message nesting depth; the top-level message is depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Context for one level of message nesting
    pub fn nested(&self) -> Result<Context<'a>> {
        if self.depth >= self.config.recursion_limit {
            return Err(Error::RecursionLimitExceeded {
                limit: self.config.recursion_limit,
            });
        }
        Ok(Context {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Encodes every field of `message` in slot order
    pub fn serialize_message(&self, message: &dyn Message) -> Result<Bytes> {
        let descriptor = message.descriptor();
        let mut writer = Writer::new();
        for (slot, field) in descriptor.fields().iter().enumerate() {
            let value = message.property(slot)?;
            self.write_field(&mut writer, field.number, &field.kind, &value)?;
        }
        trace!(
            "serialized {} ({} bytes) at depth {}",
            descriptor.name(),
            writer.len(),
            self.depth
        );
        Ok(writer.freeze())
    }

    /// Decodes fields from `cursor` into `message` until it is exhausted
    ///
    /// Unknown field numbers are skipped. On error `message` is left
    /// partially updated.
    pub fn deserialize_message(&self, message: &mut dyn Message, cursor: &mut Cursor<'_>) -> Result<()> {
        while !cursor.is_exhausted() {
            let tag = decode_header(cursor).map_err(|e| {
                warn!("{}", e);
                e
            })?;

            let descriptor = message.descriptor();
            let Some(slot) = descriptor.slot_for(tag.field_number) else {
                debug!(
                    "skipping unknown field {} ({}) of {}",
                    tag.field_number,
                    tag.wire_type,
                    descriptor.name()
                );
                skip_field(cursor, tag.wire_type)?;
                continue;
            };
            let handler = self.registry.handler(&descriptor.fields()[slot].kind)?;

            let mut value = message.take_property(slot)?;
            handler.deserialize(self, cursor, tag, &mut value)?;
            message.set_property(slot, value)?;
        }
        Ok(())
    }

    /// Encodes one field, header included
    ///
    /// Returns empty bytes when the handler suppresses the field.
    pub fn serialize_field(&self, field_number: u32, kind: &FieldKind, value: &Value) -> Result<Bytes> {
        let mut writer = Writer::new();
        self.write_field(&mut writer, field_number, kind, value)?;
        Ok(writer.freeze())
    }

    /// Decodes one field occurrence whose header has already been read
    pub fn deserialize_field(
        &self,
        cursor: &mut Cursor<'_>,
        kind: &FieldKind,
        tag: FieldTag,
        value: &mut Value,
    ) -> Result<()> {
        self.registry.handler(kind)?.deserialize(self, cursor, tag, value)
    }

    pub(crate) fn write_field(
        &self,
        writer: &mut Writer,
        field_number: u32,
        kind: &FieldKind,
        value: &Value,
    ) -> Result<()> {
        if field_number == 0 || field_number > MAX_FIELD_NUMBER {
            return Err(Error::InvalidFieldNumber {
                number: field_number,
                max: MAX_FIELD_NUMBER,
            });
        }
        let handler = self.registry.handler(kind)?;
        let mut number = Some(field_number);
        let payload = handler.serialize(self, value, &mut number)?;
        match (handler.wire_type(), number) {
            (Some(wire_type), Some(number)) => {
                writer.write_tag(number, wire_type);
                writer.write_raw(&payload);
            }
            // Suppressed, or the handler wrote its own headers
            _ => writer.write_raw(&payload),
        }
        Ok(())
    }
}

/// Serializes and deserializes messages
///
/// A `Serializer` is immutable once built and is `Send + Sync`, so one
/// instance can be shared process-wide, for example from a
/// `std::sync::OnceLock`.
#[derive(Debug)]
pub struct Serializer {
    registry: Registry,
    config: SerializerConfig,
}

impl Serializer {
    /// Creates a serializer with the default configuration
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, SerializerConfig::default())
    }

    /// Creates a serializer with custom configuration
    pub fn with_config(registry: Registry, config: SerializerConfig) -> Self {
        Self { registry, config }
    }

    /// Handler registry in use
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    fn context(&self) -> Context<'_> {
        Context {
            registry: &self.registry,
            config: &self.config,
            depth: 0,
        }
    }

    /// Encodes `message`
    pub fn serialize(&self, message: &dyn Message) -> Result<Bytes> {
        let bytes = self.context().serialize_message(message)?;
        debug!(
            "serialized {} into {} bytes",
            message.descriptor().name(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Decodes `data` into `message` in place
    ///
    /// Fields present in `data` are merged into the current contents. On
    /// error `message` is left partially updated; [`decode`](Self::decode)
    /// avoids that.
    pub fn deserialize(&self, message: &mut dyn Message, data: &[u8]) -> Result<()> {
        debug!(
            "deserializing {} bytes into {}",
            data.len(),
            message.descriptor().name()
        );
        let mut cursor = Cursor::new(data);
        self.context().deserialize_message(message, &mut cursor)
    }

    /// Decodes `data` into a fresh message of the registered type `type_name`
    ///
    /// Nothing is returned unless decoding fully succeeds.
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<DynamicMessage> {
        let descriptor = Arc::clone(self.registry.descriptor(type_name)?);
        let mut message = DynamicMessage::new(descriptor);
        self.deserialize(&mut message, data)?;
        Ok(message)
    }

    /// Reads `path` and decodes it as a message of type `type_name`
    pub fn decode_file(&self, type_name: &str, path: impl AsRef<Path>) -> Result<DynamicMessage> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
        self.decode(type_name, &data)
    }

    /// Reads every length-delimited message of type `type_name` from `path`
    pub fn decode_delimited_file(
        &self,
        type_name: &str,
        path: impl AsRef<Path>,
    ) -> Result<Vec<DynamicMessage>> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
        let descriptor = self.registry.descriptor(type_name)?;
        let mut cursor = Cursor::new(&data);
        let mut messages = Vec::new();
        while !cursor.is_exhausted() {
            let mut message = DynamicMessage::new(Arc::clone(descriptor));
            self.deserialize_delimited(&mut message, &mut cursor)?;
            messages.push(message);
        }
        debug!("read {} messages from {}", messages.len(), path.display());
        Ok(messages)
    }

    /// Encodes `message` prefixed with its varint byte length
    pub fn serialize_delimited(&self, message: &dyn Message) -> Result<Bytes> {
        let payload = self.serialize(message)?;
        let mut writer = Writer::with_capacity(payload.len() + 5);
        writer.write_length_delimited(&payload);
        Ok(writer.freeze())
    }

    /// Decodes one length-prefixed message from `cursor` into `message`
    ///
    /// The cursor is left at the start of the next message, so a sequence of
    /// delimited messages can be read in a loop.
    pub fn deserialize_delimited(&self, message: &mut dyn Message, cursor: &mut Cursor<'_>) -> Result<()> {
        let mut payload = cursor.length_delimited_cursor()?;
        self.context().deserialize_message(message, &mut payload)
    }

    /// Encodes a single field, header included
    pub fn serialize_field(&self, field_number: u32, kind: &FieldKind, value: &Value) -> Result<Bytes> {
        self.context().serialize_field(field_number, kind, value)
    }

    /// Decodes one field occurrence whose header has already been read
    pub fn deserialize_field(
        &self,
        cursor: &mut Cursor<'_>,
        kind: &FieldKind,
        tag: FieldTag,
        value: &mut Value,
    ) -> Result<()> {
        self.context().deserialize_field(cursor, kind, tag, value)
    }
}
