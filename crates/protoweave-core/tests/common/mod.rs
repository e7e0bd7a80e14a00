//! Shared test schemas and helpers
#![allow(dead_code)]

use protoweave_core::schema::{ElementKind, FieldKind, MessageDescriptor, ScalarType};
use protoweave_core::{DynamicMessage, Registry, Serializer, SerializerConfig, Value};
use std::sync::Arc;

pub const SIMPLE: &str = "protoweave.tests.SimpleStringMessage";
pub const COMPLEX: &str = "protoweave.tests.ComplexMessage";
pub const REPEATED_COMPLEX: &str = "protoweave.tests.RepeatedComplexMessage";

/// Registry holding the fixed test schemas
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    let simple = MessageDescriptor::builder(SIMPLE)
        .field(6, "testFieldString", ScalarType::String)
        .build()
        .unwrap();
    let complex = MessageDescriptor::builder(COMPLEX)
        .field(1, "testFieldInt", ScalarType::Int32)
        .field(2, "testComplexField", FieldKind::message(SIMPLE))
        .build()
        .unwrap();
    let repeated = MessageDescriptor::builder(REPEATED_COMPLEX)
        .field(1, "testRepeatedComplex", FieldKind::list(ElementKind::message(COMPLEX)))
        .build()
        .unwrap();
    registry.register_message(simple).unwrap();
    registry.register_message(complex).unwrap();
    registry.register_message(repeated).unwrap();
    registry
}

pub fn serializer() -> Serializer {
    Serializer::new(registry())
}

pub fn serializer_with(config: SerializerConfig) -> Serializer {
    Serializer::with_config(registry(), config)
}

/// Registers a message with a single field and returns its descriptor
pub fn single_field(
    registry: &mut Registry,
    name: &str,
    number: u32,
    kind: impl Into<FieldKind>,
) -> Arc<MessageDescriptor> {
    let descriptor = MessageDescriptor::builder(name)
        .field(number, "testField", kind)
        .build()
        .unwrap();
    registry.register_message(descriptor.clone()).unwrap();
    descriptor
}

/// Serializer whose registry also knows one single-field message
pub fn single_field_serializer(
    number: u32,
    kind: impl Into<FieldKind>,
) -> (Serializer, Arc<MessageDescriptor>) {
    let mut registry = registry();
    let descriptor = single_field(&mut registry, "protoweave.tests.SingleField", number, kind);
    (Serializer::new(registry), descriptor)
}

pub fn simple(s: &Serializer, text: &str) -> DynamicMessage {
    DynamicMessage::new(s.registry().descriptor(SIMPLE).unwrap().clone())
        .with("testFieldString", text)
        .unwrap()
}

pub fn complex(s: &Serializer, int: i32, text: &str) -> DynamicMessage {
    DynamicMessage::new(s.registry().descriptor(COMPLEX).unwrap().clone())
        .with("testFieldInt", Value::Int32(int))
        .unwrap()
        .with("testComplexField", simple(s, text))
        .unwrap()
}

/// Reads the nested string of a complex message
pub fn complex_parts(message: &DynamicMessage) -> (i32, String) {
    let int = match message.get("testFieldInt") {
        Some(Value::Int32(v)) => *v,
        other => panic!("unexpected testFieldInt {:?}", other),
    };
    let text = message
        .get("testComplexField")
        .and_then(Value::as_message)
        .and_then(|m| m.get("testFieldString"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    (int, text)
}

pub fn unhex(text: &str) -> Vec<u8> {
    hex::decode(text).unwrap()
}
