//! Descriptors for the `google.protobuf` well-known types.
//!
//! These are ordinary messages as far as the wire format is concerned, so
//! they are plain [`MessageDescriptor`]s with the field numbers of the
//! upstream `.proto` files. Field names keep their `.proto` spelling.
//! [`Registry::register_well_known`](crate::Registry::register_well_known)
//! registers all of them at once.
//!
//! Oneof members (the `kind` of [`VALUE`]) are modelled as ordinary
//! implicit-presence fields, so a zero number or `false` bool member is
//! omitted on the wire like any other default.

use crate::error::Result;
use crate::schema::{ElementKind, FieldKind, MessageDescriptor, ScalarType};
use std::sync::Arc;

/// `google.protobuf.Any`
pub const ANY: &str = "google.protobuf.Any";
/// `google.protobuf.Duration`
pub const DURATION: &str = "google.protobuf.Duration";
/// `google.protobuf.Empty`
pub const EMPTY: &str = "google.protobuf.Empty";
/// `google.protobuf.FieldMask`
pub const FIELD_MASK: &str = "google.protobuf.FieldMask";
/// `google.protobuf.SourceContext`
pub const SOURCE_CONTEXT: &str = "google.protobuf.SourceContext";
/// `google.protobuf.Struct`
pub const STRUCT: &str = "google.protobuf.Struct";
/// `google.protobuf.Value`
pub const VALUE: &str = "google.protobuf.Value";
/// `google.protobuf.ListValue`
pub const LIST_VALUE: &str = "google.protobuf.ListValue";
/// `google.protobuf.NullValue` (enum)
pub const NULL_VALUE: &str = "google.protobuf.NullValue";
/// `google.protobuf.Timestamp`
pub const TIMESTAMP: &str = "google.protobuf.Timestamp";
/// `google.protobuf.Syntax` (enum)
pub const SYNTAX: &str = "google.protobuf.Syntax";
/// `google.protobuf.Option`
pub const OPTION: &str = "google.protobuf.Option";
/// `google.protobuf.Type`
pub const TYPE: &str = "google.protobuf.Type";
/// `google.protobuf.Field`
pub const FIELD: &str = "google.protobuf.Field";
/// `google.protobuf.Field.Kind` (enum)
pub const FIELD_KIND: &str = "google.protobuf.Field.Kind";
/// `google.protobuf.Field.Cardinality` (enum)
pub const FIELD_CARDINALITY: &str = "google.protobuf.Field.Cardinality";
/// `google.protobuf.Enum`
pub const ENUM: &str = "google.protobuf.Enum";
/// `google.protobuf.EnumValue`
pub const ENUM_VALUE: &str = "google.protobuf.EnumValue";
/// `google.protobuf.Api`
pub const API: &str = "google.protobuf.Api";
/// `google.protobuf.Method`
pub const METHOD: &str = "google.protobuf.Method";
/// `google.protobuf.Mixin`
pub const MIXIN: &str = "google.protobuf.Mixin";

/// Wrapper messages and the scalar each one holds in field 1
pub const WRAPPERS: [(&str, ScalarType); 9] = [
    ("google.protobuf.DoubleValue", ScalarType::Double),
    ("google.protobuf.FloatValue", ScalarType::Float),
    ("google.protobuf.Int64Value", ScalarType::Int64),
    ("google.protobuf.UInt64Value", ScalarType::UInt64),
    ("google.protobuf.Int32Value", ScalarType::Int32),
    ("google.protobuf.UInt32Value", ScalarType::UInt32),
    ("google.protobuf.BoolValue", ScalarType::Bool),
    ("google.protobuf.StringValue", ScalarType::String),
    ("google.protobuf.BytesValue", ScalarType::Bytes),
];

/// Seconds and nanos, shared by `Duration` and `Timestamp`
fn seconds_nanos(name: &str) -> Result<Arc<MessageDescriptor>> {
    MessageDescriptor::builder(name)
        .field(1, "seconds", ScalarType::Int64)
        .field(2, "nanos", ScalarType::Int32)
        .build()
}

fn options() -> FieldKind {
    FieldKind::list(ElementKind::message(OPTION))
}

/// Every well-known message descriptor
pub fn descriptors() -> Result<Vec<Arc<MessageDescriptor>>> {
    let mut descriptors = vec![
        MessageDescriptor::builder(ANY)
            .field(1, "type_url", ScalarType::String)
            .field(2, "value", ScalarType::Bytes)
            .build()?,
        seconds_nanos(DURATION)?,
        seconds_nanos(TIMESTAMP)?,
        MessageDescriptor::builder(EMPTY).build()?,
        MessageDescriptor::builder(FIELD_MASK)
            .field(1, "paths", FieldKind::list(ScalarType::String))
            .build()?,
        MessageDescriptor::builder(SOURCE_CONTEXT)
            .field(1, "file_name", ScalarType::String)
            .build()?,
        MessageDescriptor::builder(STRUCT)
            .field(
                1,
                "fields",
                FieldKind::map(ScalarType::String, ElementKind::message(VALUE)),
            )
            .build()?,
        MessageDescriptor::builder(VALUE)
            .field(1, "null_value", FieldKind::enumeration(NULL_VALUE))
            .field(2, "number_value", ScalarType::Double)
            .field(3, "string_value", ScalarType::String)
            .field(4, "bool_value", ScalarType::Bool)
            .field(5, "struct_value", FieldKind::message(STRUCT))
            .field(6, "list_value", FieldKind::message(LIST_VALUE))
            .build()?,
        MessageDescriptor::builder(LIST_VALUE)
            .field(1, "values", FieldKind::list(ElementKind::message(VALUE)))
            .build()?,
        MessageDescriptor::builder(OPTION)
            .field(1, "name", ScalarType::String)
            .field(2, "value", FieldKind::message(ANY))
            .build()?,
        MessageDescriptor::builder(TYPE)
            .field(1, "name", ScalarType::String)
            .field(2, "fields", FieldKind::list(ElementKind::message(FIELD)))
            .field(3, "oneofs", FieldKind::list(ScalarType::String))
            .field(4, "options", options())
            .field(5, "source_context", FieldKind::message(SOURCE_CONTEXT))
            .field(6, "syntax", FieldKind::enumeration(SYNTAX))
            .field(7, "edition", ScalarType::String)
            .build()?,
        MessageDescriptor::builder(FIELD)
            .field(1, "kind", FieldKind::enumeration(FIELD_KIND))
            .field(2, "cardinality", FieldKind::enumeration(FIELD_CARDINALITY))
            .field(3, "number", ScalarType::Int32)
            .field(4, "name", ScalarType::String)
            .field(6, "type_url", ScalarType::String)
            .field(7, "oneof_index", ScalarType::Int32)
            .field(8, "packed", ScalarType::Bool)
            .field(9, "options", options())
            .field(10, "json_name", ScalarType::String)
            .field(11, "default_value", ScalarType::String)
            .build()?,
        MessageDescriptor::builder(ENUM)
            .field(1, "name", ScalarType::String)
            .field(2, "enumvalue", FieldKind::list(ElementKind::message(ENUM_VALUE)))
            .field(3, "options", options())
            .field(4, "source_context", FieldKind::message(SOURCE_CONTEXT))
            .field(5, "syntax", FieldKind::enumeration(SYNTAX))
            .field(6, "edition", ScalarType::String)
            .build()?,
        MessageDescriptor::builder(ENUM_VALUE)
            .field(1, "name", ScalarType::String)
            .field(2, "number", ScalarType::Int32)
            .field(3, "options", options())
            .build()?,
        MessageDescriptor::builder(API)
            .field(1, "name", ScalarType::String)
            .field(2, "methods", FieldKind::list(ElementKind::message(METHOD)))
            .field(3, "options", options())
            .field(4, "version", ScalarType::String)
            .field(5, "source_context", FieldKind::message(SOURCE_CONTEXT))
            .field(6, "mixins", FieldKind::list(ElementKind::message(MIXIN)))
            .field(7, "syntax", FieldKind::enumeration(SYNTAX))
            .build()?,
        MessageDescriptor::builder(METHOD)
            .field(1, "name", ScalarType::String)
            .field(2, "request_type_url", ScalarType::String)
            .field(3, "request_streaming", ScalarType::Bool)
            .field(4, "response_type_url", ScalarType::String)
            .field(5, "response_streaming", ScalarType::Bool)
            .field(6, "options", options())
            .field(7, "syntax", FieldKind::enumeration(SYNTAX))
            .build()?,
        MessageDescriptor::builder(MIXIN)
            .field(1, "name", ScalarType::String)
            .field(2, "root", ScalarType::String)
            .build()?,
    ];
    for (name, scalar) in WRAPPERS {
        descriptors.push(
            MessageDescriptor::builder(name)
                .field(1, "value", scalar)
                .build()?,
        );
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn test_descriptors_are_unique() {
        let descriptors = descriptors().unwrap();
        let mut names: Vec<_> = descriptors.iter().map(|d| d.name().to_owned()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), descriptors.len());
        assert_eq!(descriptors.len(), 17 + WRAPPERS.len());
    }

    #[test]
    fn test_register_well_known_resolves_every_field() {
        let mut registry = Registry::new();
        registry.register_well_known().unwrap();
        for descriptor in descriptors().unwrap() {
            assert!(registry.descriptor(descriptor.name()).is_ok());
            for field in descriptor.fields() {
                assert!(
                    registry.contains(&field.kind),
                    "{}.{}",
                    descriptor.name(),
                    field.name
                );
            }
        }
        assert!(registry.contains(&FieldKind::enumeration(NULL_VALUE)));
    }

    #[test]
    fn test_empty_has_no_fields() {
        let mut registry = Registry::new();
        registry.register_well_known().unwrap();
        assert!(registry.descriptor(EMPTY).unwrap().fields().is_empty());
    }
}
