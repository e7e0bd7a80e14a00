//! Dynamically-typed field values.

use crate::error::{Error, Result};
use crate::message::DynamicMessage;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// A field value, one variant per handled kind
///
/// The scalar variant names match [`ScalarType`](crate::schema::ScalarType)
/// so the encoding of a value is never ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset embedded message
    Null,
    /// `int32`
    Int32(i32),
    /// `int64`
    Int64(i64),
    /// `uint32`
    UInt32(u32),
    /// `uint64`
    UInt64(u64),
    /// `sint32`
    SInt32(i32),
    /// `sint64`
    SInt64(i64),
    /// `fixed32`
    Fixed32(u32),
    /// `fixed64`
    Fixed64(u64),
    /// `sfixed32`
    SFixed32(i32),
    /// `sfixed64`
    SFixed64(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `bool`
    Bool(bool),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Bytes),
    /// Enum ordinal
    Enum(i32),
    /// Embedded message
    Message(Box<DynamicMessage>),
    /// Repeated field contents, in wire order
    List(Vec<Value>),
    /// Map field contents
    Map(BTreeMap<MapKey, Value>),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::SInt32(_) => "sint32",
            Value::SInt64(_) => "sint64",
            Value::Fixed32(_) => "fixed32",
            Value::Fixed64(_) => "fixed64",
            Value::SFixed32(_) => "sfixed32",
            Value::SFixed64(_) => "sfixed64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether the value equals its kind's proto3 default
    ///
    /// Floats compare by bit pattern, so `-0.0` is not a default. A present
    /// message is never a default, even when all its fields are.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Int32(v) | Value::SInt32(v) | Value::SFixed32(v) | Value::Enum(v) => *v == 0,
            Value::Int64(v) | Value::SInt64(v) | Value::SFixed64(v) => *v == 0,
            Value::UInt32(v) | Value::Fixed32(v) => *v == 0,
            Value::UInt64(v) | Value::Fixed64(v) => *v == 0,
            Value::Float(v) => v.to_bits() == 0,
            Value::Double(v) => v.to_bits() == 0,
            Value::Bool(v) => !v,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::Message(_) => false,
            Value::List(v) => v.is_empty(),
            Value::Map(v) => v.is_empty(),
        }
    }

    /// Returns true for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the embedded message
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Borrows the list elements
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the map entries
    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<DynamicMessage> for Value {
    fn from(message: DynamicMessage) -> Self {
        Value::Message(Box::new(message))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Map key; the subset of scalars protobuf allows as keys
///
/// Ordering is by variant, then by value, which gives maps a deterministic
/// encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    /// `int32` key
    Int32(i32),
    /// `int64` key
    Int64(i64),
    /// `uint32` key
    UInt32(u32),
    /// `uint64` key
    UInt64(u64),
    /// `sint32` key
    SInt32(i32),
    /// `sint64` key
    SInt64(i64),
    /// `fixed32` key
    Fixed32(u32),
    /// `fixed64` key
    Fixed64(u64),
    /// `sfixed32` key
    SFixed32(i32),
    /// `sfixed64` key
    SFixed64(i64),
    /// `bool` key
    Bool(bool),
    /// `string` key
    String(String),
}

impl MapKey {
    /// The equivalent [`Value`]
    pub fn to_value(&self) -> Value {
        match self.clone() {
            MapKey::Int32(v) => Value::Int32(v),
            MapKey::Int64(v) => Value::Int64(v),
            MapKey::UInt32(v) => Value::UInt32(v),
            MapKey::UInt64(v) => Value::UInt64(v),
            MapKey::SInt32(v) => Value::SInt32(v),
            MapKey::SInt64(v) => Value::SInt64(v),
            MapKey::Fixed32(v) => Value::Fixed32(v),
            MapKey::Fixed64(v) => Value::Fixed64(v),
            MapKey::SFixed32(v) => Value::SFixed32(v),
            MapKey::SFixed64(v) => Value::SFixed64(v),
            MapKey::Bool(v) => Value::Bool(v),
            MapKey::String(v) => Value::String(v),
        }
    }
}

impl TryFrom<Value> for MapKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Int32(v) => MapKey::Int32(v),
            Value::Int64(v) => MapKey::Int64(v),
            Value::UInt32(v) => MapKey::UInt32(v),
            Value::UInt64(v) => MapKey::UInt64(v),
            Value::SInt32(v) => MapKey::SInt32(v),
            Value::SInt64(v) => MapKey::SInt64(v),
            Value::Fixed32(v) => MapKey::Fixed32(v),
            Value::Fixed64(v) => MapKey::Fixed64(v),
            Value::SFixed32(v) => MapKey::SFixed32(v),
            Value::SFixed64(v) => MapKey::SFixed64(v),
            Value::Bool(v) => MapKey::Bool(v),
            Value::String(v) => MapKey::String(v),
            other => return Err(Error::type_mismatch("map key", other.kind_name())),
        })
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::String(s.to_owned())
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int32(v) | MapKey::SInt32(v) | MapKey::SFixed32(v) => write!(f, "{}", v),
            MapKey::Int64(v) | MapKey::SInt64(v) | MapKey::SFixed64(v) => write!(f, "{}", v),
            MapKey::UInt32(v) | MapKey::Fixed32(v) => write!(f, "{}", v),
            MapKey::UInt64(v) | MapKey::Fixed64(v) => write!(f, "{}", v),
            MapKey::Bool(v) => write!(f, "{}", v),
            MapKey::String(v) => write!(f, "{:?}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_default() {
        assert!(Value::Int32(0).is_default());
        assert!(Value::Float(0.0).is_default());
        assert!(!Value::Float(-0.0).is_default());
        assert!(!Value::Double(f64::NAN).is_default());
        assert!(Value::String(String::new()).is_default());
        assert!(!Value::from("x").is_default());
        assert!(Value::Enum(0).is_default());
        assert!(Value::List(vec![]).is_default());
    }

    #[test]
    fn test_map_key_conversion() {
        let key = MapKey::try_from(Value::SInt32(-4)).unwrap();
        assert_eq!(key, MapKey::SInt32(-4));
        assert_eq!(key.to_value(), Value::SInt32(-4));

        let err = MapKey::try_from(Value::Double(1.0)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_map_key_order() {
        let mut keys = vec![MapKey::Int32(42), MapKey::Int32(-1), MapKey::Int32(10)];
        keys.sort();
        assert_eq!(keys, vec![MapKey::Int32(-1), MapKey::Int32(10), MapKey::Int32(42)]);
    }
}
