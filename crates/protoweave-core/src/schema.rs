//! Type descriptions consulted by the serializer.
//!
//! A [`MessageDescriptor`] is the fixed field-number to slot ordering of one
//! message type. It is built once, validated, and shared read-only behind an
//! [`Arc`]. Message and enum kinds name other types instead of embedding
//! them, so a message may contain itself through a list or map field.

use crate::error::{Error, Result};
use crate::value::Value;
use crate::wire::{WireType, MAX_FIELD_NUMBER};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Protobuf scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    /// Varint, sign-extended to 64 bits when negative
    Int32,
    /// Varint
    Int64,
    /// Varint
    UInt32,
    /// Varint
    UInt64,
    /// ZigZag varint
    SInt32,
    /// ZigZag varint
    SInt64,
    /// Little-endian 4 bytes
    Fixed32,
    /// Little-endian 8 bytes
    Fixed64,
    /// Little-endian 4 bytes, signed
    SFixed32,
    /// Little-endian 8 bytes, signed
    SFixed64,
    /// IEEE-754 single
    Float,
    /// IEEE-754 double
    Double,
    /// Varint 0 or 1
    Bool,
    /// Length-delimited UTF-8
    String,
    /// Length-delimited raw bytes
    Bytes,
}

impl ScalarType {
    /// All scalar types, in declaration order
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::SInt32,
        ScalarType::SInt64,
        ScalarType::Fixed32,
        ScalarType::Fixed64,
        ScalarType::SFixed32,
        ScalarType::SFixed64,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
    ];

    /// Wire type a singular value of this type is written with
    pub fn wire_type(self) -> WireType {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::UInt32
            | ScalarType::UInt64
            | ScalarType::SInt32
            | ScalarType::SInt64
            | ScalarType::Bool => WireType::Varint,
            ScalarType::Fixed32 | ScalarType::SFixed32 | ScalarType::Float => WireType::Fixed32,
            ScalarType::Fixed64 | ScalarType::SFixed64 | ScalarType::Double => WireType::Fixed64,
            ScalarType::String | ScalarType::Bytes => WireType::LengthDelimited,
        }
    }

    /// Proto3 default value
    pub fn default_value(self) -> Value {
        match self {
            ScalarType::Int32 => Value::Int32(0),
            ScalarType::Int64 => Value::Int64(0),
            ScalarType::UInt32 => Value::UInt32(0),
            ScalarType::UInt64 => Value::UInt64(0),
            ScalarType::SInt32 => Value::SInt32(0),
            ScalarType::SInt64 => Value::SInt64(0),
            ScalarType::Fixed32 => Value::Fixed32(0),
            ScalarType::Fixed64 => Value::Fixed64(0),
            ScalarType::SFixed32 => Value::SFixed32(0),
            ScalarType::SFixed64 => Value::SFixed64(0),
            ScalarType::Float => Value::Float(0.0),
            ScalarType::Double => Value::Double(0.0),
            ScalarType::Bool => Value::Bool(false),
            ScalarType::String => Value::String(String::new()),
            ScalarType::Bytes => Value::Bytes(bytes::Bytes::new()),
        }
    }

    /// Whether repeated values of this type can share one packed payload
    pub fn is_packable(self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }

    /// Whether this type may be a map key (integral, bool or string)
    pub fn is_map_key(self) -> bool {
        !matches!(
            self,
            ScalarType::Float | ScalarType::Double | ScalarType::Bytes
        )
    }

    /// The `.proto` keyword for this type
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::SInt32 => "sint32",
            ScalarType::SInt64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::SFixed32 => "sfixed32",
            ScalarType::SFixed64 => "sfixed64",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of a single list element or map value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Scalar element
    Scalar(ScalarType),
    /// Enum element, by fully-qualified enum name
    Enum(String),
    /// Message element, by fully-qualified message name
    Message(String),
}

impl ElementKind {
    /// Shorthand for an enum element kind
    pub fn enumeration(name: impl Into<String>) -> Self {
        ElementKind::Enum(name.into())
    }

    /// Shorthand for a message element kind
    pub fn message(name: impl Into<String>) -> Self {
        ElementKind::Message(name.into())
    }

    /// Wire type one element is written with when not packed
    pub fn wire_type(&self) -> WireType {
        match self {
            ElementKind::Scalar(scalar) => scalar.wire_type(),
            ElementKind::Enum(_) => WireType::Varint,
            ElementKind::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Whether a list of this element kind is written packed
    pub fn is_packable(&self) -> bool {
        match self {
            ElementKind::Scalar(scalar) => scalar.is_packable(),
            ElementKind::Enum(_) => true,
            ElementKind::Message(_) => false,
        }
    }
}

impl From<ScalarType> for ElementKind {
    fn from(scalar: ScalarType) -> Self {
        ElementKind::Scalar(scalar)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Scalar(scalar) => write!(f, "{}", scalar),
            ElementKind::Enum(name) => write!(f, "enum {}", name),
            ElementKind::Message(name) => write!(f, "message {}", name),
        }
    }
}

/// Kind of a message field; the key handlers are registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Singular scalar
    Scalar(ScalarType),
    /// Singular enum
    Enum(String),
    /// Singular embedded message
    Message(String),
    /// Repeated field
    List(ElementKind),
    /// Map field with scalar keys
    Map(ScalarType, ElementKind),
}

impl FieldKind {
    /// Shorthand for a singular enum kind
    pub fn enumeration(name: impl Into<String>) -> Self {
        FieldKind::Enum(name.into())
    }

    /// Shorthand for a singular message kind
    pub fn message(name: impl Into<String>) -> Self {
        FieldKind::Message(name.into())
    }

    /// Shorthand for a repeated kind
    pub fn list(element: impl Into<ElementKind>) -> Self {
        FieldKind::List(element.into())
    }

    /// Shorthand for a map kind
    pub fn map(key: ScalarType, value: impl Into<ElementKind>) -> Self {
        FieldKind::Map(key, value.into())
    }

    /// Value a freshly constructed field of this kind holds
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Scalar(scalar) => scalar.default_value(),
            FieldKind::Enum(_) => Value::Enum(0),
            FieldKind::Message(_) => Value::Null,
            FieldKind::List(_) => Value::List(Vec::new()),
            FieldKind::Map(_, _) => Value::Map(Default::default()),
        }
    }
}

impl From<ScalarType> for FieldKind {
    fn from(scalar: ScalarType) -> Self {
        FieldKind::Scalar(scalar)
    }
}

impl From<ElementKind> for FieldKind {
    fn from(element: ElementKind) -> Self {
        match element {
            ElementKind::Scalar(scalar) => FieldKind::Scalar(scalar),
            ElementKind::Enum(name) => FieldKind::Enum(name),
            ElementKind::Message(name) => FieldKind::Message(name),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(scalar) => write!(f, "{}", scalar),
            FieldKind::Enum(name) => write!(f, "enum {}", name),
            FieldKind::Message(name) => write!(f, "message {}", name),
            FieldKind::List(element) => write!(f, "repeated {}", element),
            FieldKind::Map(key, value) => write!(f, "map<{}, {}>", key, value),
        }
    }
}

/// One field of a message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire field number
    pub number: u32,
    /// Field name
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
}

/// Field ordering of one message type
///
/// Field declaration order is slot order and is also the order fields are
/// written in.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_number: HashMap<u32, usize>,
}

impl MessageDescriptor {
    /// Starts building a descriptor for the fully-qualified message `name`
    pub fn builder(name: impl Into<String>) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Fully-qualified message name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in slot order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field in the given slot
    pub fn field(&self, slot: usize) -> Option<&FieldDescriptor> {
        self.fields.get(slot)
    }

    /// Slot a wire field number maps to, if the field is known
    pub fn slot_for(&self, number: u32) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    /// Slot of the field called `name`
    pub fn slot_named(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Builder for [`MessageDescriptor`]
#[derive(Debug)]
pub struct MessageDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageDescriptorBuilder {
    /// Appends a field; its slot is its position in the builder
    pub fn field(
        mut self,
        number: u32,
        name: impl Into<String>,
        kind: impl Into<FieldKind>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            number,
            name: name.into(),
            kind: kind.into(),
        });
        self
    }

    /// Validates field numbers and freezes the ordering
    pub fn build(self) -> Result<Arc<MessageDescriptor>> {
        let mut by_number = HashMap::with_capacity(self.fields.len());
        for (slot, field) in self.fields.iter().enumerate() {
            if field.number == 0 || field.number > MAX_FIELD_NUMBER {
                return Err(Error::InvalidFieldNumber {
                    number: field.number,
                    max: MAX_FIELD_NUMBER,
                });
            }
            if by_number.insert(field.number, slot).is_some() {
                return Err(Error::DuplicateFieldNumber {
                    message: self.name,
                    number: field.number,
                });
            }
        }
        Ok(Arc::new(MessageDescriptor {
            name: self.name,
            fields: self.fields,
            by_number,
        }))
    }
}
