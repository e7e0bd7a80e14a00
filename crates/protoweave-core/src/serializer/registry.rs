//! Handler registry keyed by [`FieldKind`].

use super::{collections, nested, scalar, Context};
use crate::error::{Error, Result};
use crate::message::DynamicMessage;
use crate::schema::{ElementKind, FieldKind, MessageDescriptor, ScalarType};
use crate::value::Value;
use crate::well_known;
use crate::wire::{Cursor, FieldTag, WireType};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Encodes one field value into its payload bytes.
///
/// The field number is passed by mutable reference. A handler sets it to
/// `None` either to suppress the field entirely (empty payload) or because it
/// already wrote its own headers, as unpacked lists and maps do.
pub type SerializeFn =
    Arc<dyn Fn(&Context<'_>, &Value, &mut Option<u32>) -> Result<Bytes> + Send + Sync>;

/// Decodes one field occurrence into the accumulated value.
///
/// The cursor is positioned just after the field header.
pub type DeserializeFn =
    Arc<dyn Fn(&Context<'_>, &mut Cursor<'_>, FieldTag, &mut Value) -> Result<()> + Send + Sync>;

/// Encoder, decoder and header wire type for one field kind
#[derive(Clone)]
pub struct SerializationHandler {
    serialize: SerializeFn,
    deserialize: DeserializeFn,
    wire_type: Option<WireType>,
}

impl SerializationHandler {
    /// Creates a handler
    ///
    /// With `wire_type` of `None` the serializer never prepends a header,
    /// and the handler is expected to write its own.
    pub fn new<S, D>(serialize: S, deserialize: D, wire_type: Option<WireType>) -> Self
    where
        S: Fn(&Context<'_>, &Value, &mut Option<u32>) -> Result<Bytes> + Send + Sync + 'static,
        D: Fn(&Context<'_>, &mut Cursor<'_>, FieldTag, &mut Value) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        Self {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
            wire_type,
        }
    }

    /// Wire type of the header the serializer writes before the payload
    pub fn wire_type(&self) -> Option<WireType> {
        self.wire_type
    }

    /// Runs the encoder
    pub fn serialize(
        &self,
        ctx: &Context<'_>,
        value: &Value,
        field_number: &mut Option<u32>,
    ) -> Result<Bytes> {
        (self.serialize)(ctx, value, field_number)
    }

    /// Runs the decoder
    pub fn deserialize(
        &self,
        ctx: &Context<'_>,
        cursor: &mut Cursor<'_>,
        tag: FieldTag,
        value: &mut Value,
    ) -> Result<()> {
        (self.deserialize)(ctx, cursor, tag, value)
    }
}

impl fmt::Debug for SerializationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationHandler")
            .field("wire_type", &self.wire_type)
            .finish_non_exhaustive()
    }
}

/// Table of handlers and message descriptors
///
/// Every scalar kind and every list of a scalar kind is available from
/// [`Registry::new`]. Message, enum and map kinds are added with the
/// `register_*` helpers before the registry is handed to a
/// [`Serializer`](super::Serializer), after which it is read-only.
#[derive(Debug)]
pub struct Registry {
    handlers: HashMap<FieldKind, SerializationHandler>,
    messages: HashMap<String, Arc<MessageDescriptor>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry holding the scalar and list-of-scalar handlers
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            messages: HashMap::new(),
        };
        for scalar in ScalarType::ALL {
            registry.register(FieldKind::Scalar(scalar), scalar::scalar_handler(scalar));
            registry.register(
                FieldKind::list(scalar),
                collections::list_handler(ElementKind::Scalar(scalar)),
            );
        }
        registry
    }

    /// Registers a handler for `kind`; an existing handler is kept
    pub fn register(&mut self, kind: FieldKind, handler: SerializationHandler) -> &mut Self {
        if !self.handlers.contains_key(&kind) {
            trace!("registering handler for {}", kind);
            self.handlers.insert(kind, handler);
        }
        self
    }

    /// Registers a message type, the list of it, and the enum and map kinds
    /// its fields use
    ///
    /// Message types referenced by the fields must be registered separately.
    pub fn register_message(&mut self, descriptor: Arc<MessageDescriptor>) -> Result<&mut Self> {
        let name = descriptor.name().to_owned();
        for field in descriptor.fields() {
            match &field.kind {
                FieldKind::Enum(enum_name) | FieldKind::List(ElementKind::Enum(enum_name)) => {
                    self.register_enum(enum_name.clone());
                }
                FieldKind::Map(key, value) => {
                    self.register_map(*key, value.clone())?;
                }
                _ => {}
            }
        }

        self.messages.entry(name.clone()).or_insert(descriptor);
        self.register(
            FieldKind::Message(name.clone()),
            nested::message_handler(name.clone()),
        );
        self.register(
            FieldKind::List(ElementKind::Message(name.clone())),
            collections::list_handler(ElementKind::Message(name)),
        );
        Ok(self)
    }

    /// Registers an enum type and the list of it
    pub fn register_enum(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.register(
            FieldKind::Enum(name.clone()),
            scalar::enum_handler(name.clone()),
        );
        self.register(
            FieldKind::List(ElementKind::Enum(name.clone())),
            collections::list_handler(ElementKind::Enum(name)),
        );
        self
    }

    /// Registers a map kind, and the value's enum type if it has one
    ///
    /// Float, double and bytes keys are rejected.
    pub fn register_map(
        &mut self,
        key: ScalarType,
        value: impl Into<ElementKind>,
    ) -> Result<&mut Self> {
        if !key.is_map_key() {
            return Err(Error::InvalidMapKey {
                kind: key.to_string(),
            });
        }
        let value = value.into();
        if let ElementKind::Enum(enum_name) = &value {
            self.register_enum(enum_name.clone());
        }
        self.register(
            FieldKind::Map(key, value.clone()),
            collections::map_handler(key, value),
        );
        Ok(self)
    }

    /// Registers every `google.protobuf` well-known type
    ///
    /// See [`well_known`](crate::well_known) for the names.
    pub fn register_well_known(&mut self) -> Result<&mut Self> {
        for descriptor in well_known::descriptors()? {
            self.register_message(descriptor)?;
        }
        Ok(self)
    }

    /// Handler for `kind`
    pub fn handler(&self, kind: &FieldKind) -> Result<&SerializationHandler> {
        self.handlers
            .get(kind)
            .ok_or_else(|| Error::unregistered(kind))
    }

    /// Descriptor of the registered message called `name`
    pub fn descriptor(&self, name: &str) -> Result<&Arc<MessageDescriptor>> {
        self.messages
            .get(name)
            .ok_or_else(|| Error::unregistered(format!("message {}", name)))
    }

    /// Returns true if a handler exists for `kind`
    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Value a map entry takes when its key or value is absent
    ///
    /// Unlike an unset singular field, a missing message value is an empty
    /// message rather than [`Value::Null`].
    pub fn default_value(&self, kind: &FieldKind) -> Result<Value> {
        match kind {
            FieldKind::Message(name) => {
                let descriptor = Arc::clone(self.descriptor(name)?);
                Ok(Value::from(DynamicMessage::new(descriptor)))
            }
            other => Ok(other.default_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> Arc<MessageDescriptor> {
        MessageDescriptor::builder("protoweave.tests.SimpleStringMessage")
            .field(6, "testFieldString", ScalarType::String)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_covers_scalars_and_lists() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 30);
        for scalar in ScalarType::ALL {
            assert!(registry.contains(&FieldKind::Scalar(scalar)));
            assert!(registry.contains(&FieldKind::list(scalar)));
        }
    }

    #[test]
    fn test_lookup_miss_is_loud() {
        let registry = Registry::new();
        let err = registry.handler(&FieldKind::message("pkg.Missing")).unwrap_err();
        assert!(matches!(err, Error::UnregisteredType { ref kind } if kind == "message pkg.Missing"));
        assert!(registry.descriptor("pkg.Missing").is_err());
    }

    #[test]
    fn test_register_message_is_idempotent() {
        let mut registry = Registry::new();
        registry.register_message(simple()).unwrap();
        let count = registry.len();
        registry.register_message(simple()).unwrap();
        assert_eq!(registry.len(), count);
        assert_eq!(count, 32);
        assert!(registry.contains(&FieldKind::list(ElementKind::message(
            "protoweave.tests.SimpleStringMessage"
        ))));
    }

    #[test]
    fn test_register_message_pulls_in_enums_and_maps() {
        let descriptor = MessageDescriptor::builder("pkg.Holder")
            .field(1, "color", FieldKind::enumeration("pkg.Color"))
            .field(2, "lookup", FieldKind::map(ScalarType::String, ScalarType::Int64))
            .build()
            .unwrap();
        let mut registry = Registry::new();
        registry.register_message(descriptor).unwrap();
        assert!(registry.contains(&FieldKind::enumeration("pkg.Color")));
        assert!(registry.contains(&FieldKind::list(ElementKind::enumeration("pkg.Color"))));
        assert!(registry.contains(&FieldKind::map(ScalarType::String, ScalarType::Int64)));
    }

    #[test]
    fn test_register_map_pulls_in_enum_values() {
        let mut registry = Registry::new();
        registry
            .register_map(ScalarType::String, ElementKind::enumeration("pkg.Color"))
            .unwrap();
        assert!(registry.contains(&FieldKind::enumeration("pkg.Color")));
        assert!(registry.contains(&FieldKind::map(
            ScalarType::String,
            ElementKind::enumeration("pkg.Color")
        )));
    }

    #[test]
    fn test_register_map_rejects_float_keys() {
        let mut registry = Registry::new();
        let err = registry
            .register_map(ScalarType::Double, ScalarType::String)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMapKey { .. }));
    }

    #[test]
    fn test_map_value_default_is_empty_message() {
        let mut registry = Registry::new();
        registry.register_message(simple()).unwrap();
        let value = registry
            .default_value(&FieldKind::message(
                "protoweave.tests.SimpleStringMessage",
            ))
            .unwrap();
        assert_eq!(
            value.as_message().and_then(|m| m.get("testFieldString")),
            Some(&Value::String(String::new()))
        );
    }
}
