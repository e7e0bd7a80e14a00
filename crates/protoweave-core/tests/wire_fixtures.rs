//! Byte-exact fixtures for known messages

mod common;

use bytes::Bytes;
use common::*;
use pretty_assertions::assert_eq;
use protoweave_core::schema::{ElementKind, FieldKind, ScalarType};
use protoweave_core::{DynamicMessage, MapKey, Serializer, Value};
use std::collections::BTreeMap;

fn encode_single(number: u32, kind: impl Into<FieldKind>, value: Value) -> String {
    let (s, descriptor) = single_field_serializer(number, kind);
    let message = DynamicMessage::new(descriptor).with("testField", value).unwrap();
    hex::encode(s.serialize(&message).unwrap())
}

fn decode_single(number: u32, kind: impl Into<FieldKind>, data: &str) -> Value {
    let (s, _) = single_field_serializer(number, kind);
    let message = s.decode("protoweave.tests.SingleField", &unhex(data)).unwrap();
    message.get("testField").cloned().unwrap()
}

fn list(values: impl IntoIterator<Item = Value>) -> Value {
    Value::List(values.into_iter().collect())
}

fn map<K: Into<MapKey>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
    Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect::<BTreeMap<_, _>>())
}

#[test]
fn test_complex_message() {
    let s = serializer();
    let bytes = s.serialize(&complex(&s, 42, "qwerty")).unwrap();
    assert_eq!(hex::encode(&bytes), "082a12083206717765727479");
}

#[test]
fn test_negative_int32_is_sign_extended() {
    let s = serializer();
    let bytes = s.serialize(&complex(&s, -45, "qwerty")).unwrap();
    assert_eq!(hex::encode(&bytes), "08d3ffffffffffffffff0112083206717765727479");

    // The five-byte form written by older encoders decodes to the same value
    let legacy = s.decode(COMPLEX, &unhex("08d3ffffff0f12083206717765727479")).unwrap();
    assert_eq!(complex_parts(&legacy), (-45, "qwerty".to_owned()));
}

#[test]
fn test_fixed_width_scalars() {
    assert_eq!(encode_single(1, ScalarType::Fixed32, Value::Fixed32(300)), "0d2c010000");
    assert_eq!(encode_single(1, ScalarType::Fixed32, Value::Fixed32(u32::MAX)), "0dffffffff");
    assert_eq!(
        encode_single(1, ScalarType::SFixed64, Value::SFixed64(i64::MIN)),
        "090000000000000080"
    );
    assert_eq!(
        encode_single(1, ScalarType::SFixed64, Value::SFixed64(i64::from(i8::MIN) - 1)),
        "097fffffffffffffff"
    );
    assert_eq!(encode_single(1, ScalarType::Float, Value::Float(0.1)), "0dcdcccc3d");
    assert_eq!(
        encode_single(1, ScalarType::Double, Value::Double(0.1)),
        "099a9999999999b93f"
    );
}

#[test]
fn test_negative_zero_float_is_written() {
    assert_eq!(encode_single(1, ScalarType::Float, Value::Float(-0.0)), "0d00000080");
    assert_eq!(encode_single(1, ScalarType::Float, Value::Float(0.0)), "");
}

#[test]
fn test_string_field() {
    assert_eq!(encode_single(6, ScalarType::String, Value::from("qwerty")), "3206717765727479");
}

#[test]
fn test_bool_and_enum_fields() {
    assert_eq!(encode_single(1, ScalarType::Bool, Value::Bool(true)), "0801");
    assert_eq!(encode_single(1, ScalarType::Bool, Value::Bool(false)), "");

    let color = FieldKind::enumeration("protoweave.tests.Color");
    assert_eq!(encode_single(1, color.clone(), Value::Enum(2)), "0802");
    assert_eq!(decode_single(1, color, "0803"), Value::Enum(3));
}

#[test]
fn test_field_number_range() {
    for (number, expected) in [
        (31, "f80102"),
        (8191, "f8ff0302"),
        (2097151, "f8ffff0702"),
        (268435455, "f8ffffff0f02"),
    ] {
        assert_eq!(encode_single(number, ScalarType::SInt32, Value::SInt32(1)), expected);
        assert_eq!(decode_single(number, ScalarType::SInt32, expected), Value::SInt32(1));
    }
}

#[test]
fn test_repeated_int32() {
    let values = list([1, 321, -65999, 123245, -3, 3].map(Value::Int32));
    let kind = FieldKind::list(ScalarType::Int32);
    assert_eq!(
        encode_single(1, kind.clone(), values.clone()),
        "0a1b01c102b1fcfbffffffffffff01edc207fdffffffffffffffff0103"
    );
    assert_eq!(decode_single(1, kind.clone(), "0a1101c102b1fcfbff0fedc207fdffffff0f03"), values);
    assert_eq!(
        decode_single(
            1,
            kind,
            "080108c10208b1fcfbffffffffffff0108edc20708fdffffffffffffffff010803"
        ),
        values
    );
}

#[test]
fn test_repeated_sint32_and_int64() {
    let sint = list([1, 321, -65999, 123245, -3, 3].map(Value::SInt32));
    assert_eq!(
        encode_single(1, FieldKind::list(ScalarType::SInt32), sint),
        "0a0b0282059d8708da850f0506"
    );

    let int64 = list([1, 321, -65999, 12324523123123, -3, 3].map(Value::Int64));
    assert_eq!(
        encode_single(1, FieldKind::list(ScalarType::Int64), int64),
        "0a1f01c102b1fcfbffffffffffff01b3c3cab6d8e602fdffffffffffffffff0103"
    );
}

#[test]
fn test_repeated_floating_point() {
    let doubles = list([0.1, 0.2, 0.3, 0.4, 0.5].map(Value::Double));
    let kind = FieldKind::list(ScalarType::Double);
    let expected = "0a289a9999999999b93f9a9999999999c93f333333333333d33f9a9999999999d93f000000000000e03f";
    assert_eq!(encode_single(1, kind.clone(), doubles.clone()), expected);
    assert_eq!(decode_single(1, kind, expected), doubles);

    let floats = list([0.4f32, 1.2, 0.5, 1.4, 0.6].map(Value::Float));
    assert_eq!(
        encode_single(1, FieldKind::list(ScalarType::Float), floats),
        "0a14cdcccc3e9a99993f0000003f3333b33f9a99193f"
    );
}

#[test]
fn test_repeated_strings_and_bytes() {
    let strings = list(["aaaa", "bbbbb", "ccc", "dddddd", "eeeee"].map(Value::from));
    let kind = FieldKind::list(ScalarType::String);
    let expected = "0a04616161610a0562626262620a036363630a066464646464640a056565656565";
    assert_eq!(encode_single(1, kind.clone(), strings.clone()), expected);
    assert_eq!(decode_single(1, kind, expected), strings);

    let bytes = list(
        [
            vec![1u8, 2, 3, 4, 5, 6],
            vec![],
            vec![0xea; 5],
            vec![1, 2, 3, 4, 5, 6],
        ]
        .map(|b| Value::Bytes(Bytes::from(b))),
    );
    let kind = FieldKind::list(ScalarType::Bytes);
    let expected = "0a060102030405060a000a05eaeaeaeaea0a06010203040506";
    assert_eq!(encode_single(1, kind.clone(), bytes.clone()), expected);
    assert_eq!(decode_single(1, kind, expected), bytes);
}

#[test]
fn test_empty_list_is_omitted() {
    assert_eq!(encode_single(1, FieldKind::list(ScalarType::Int32), list([])), "");
}

#[test]
fn test_repeated_complex() {
    let s = serializer();
    let item = Value::from(complex(&s, 25, "qwerty"));
    let message = DynamicMessage::new(s.registry().descriptor(REPEATED_COMPLEX).unwrap().clone())
        .with("testRepeatedComplex", list([item.clone(), item.clone(), item]))
        .unwrap();
    let bytes = s.serialize(&message).unwrap();
    assert_eq!(
        hex::encode(&bytes),
        "0a0c0819120832067177657274790a0c0819120832067177657274790a0c081912083206717765727479"
    );
    assert_eq!(s.decode(REPEATED_COMPLEX, &bytes).unwrap(), message);

    let decoded = s
        .decode(REPEATED_COMPLEX, &unhex("0a1508d3feffffffffffffff0112083206717765727479"))
        .unwrap();
    let items = decoded.get("testRepeatedComplex").and_then(Value::as_list).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        complex_parts(items[0].as_message().unwrap()),
        (-173, "qwerty".to_owned())
    );
}

#[test]
fn test_sint32_string_map() {
    let kind = FieldKind::map(ScalarType::SInt32, ScalarType::String);
    let value = map([
        (MapKey::SInt32(10), Value::from("ten")),
        (MapKey::SInt32(-42), Value::from("minus fourty two")),
        (MapKey::SInt32(15), Value::from("fifteen")),
    ]);
    let expected =
        "0a14085312106d696e757320666f757274792074776f0a070814120374656e0a0b081e12076669667465656e";
    assert_eq!(encode_single(1, kind.clone(), value.clone()), expected);
    assert_eq!(decode_single(1, kind, expected), value);
}

#[test]
fn test_int32_string_map() {
    let kind = FieldKind::map(ScalarType::Int32, ScalarType::String);
    let value = map([
        (MapKey::Int32(-10), Value::from("minus ten")),
        (MapKey::Int32(15), Value::from("fifteen")),
        (MapKey::Int32(42), Value::from("fourty two")),
    ]);
    let expected = "1a1608f6ffffffffffffffff0112096d696e75732074656e1a0b080f12076669667465656e1a0e082a120a666f757274792074776f";
    assert_eq!(encode_single(3, kind.clone(), value.clone()), expected);
    assert_eq!(decode_single(3, kind, expected), value);
}

#[test]
fn test_unsigned_and_fixed_key_maps() {
    let uint64 = map([
        (MapKey::UInt64(10), Value::from("ten")),
        (MapKey::UInt64(15), Value::from("fifteen")),
        (MapKey::UInt64(42), Value::from("fourty two")),
    ]);
    assert_eq!(
        encode_single(6, FieldKind::map(ScalarType::UInt64, ScalarType::String), uint64),
        "3207080a120374656e320b080f12076669667465656e320e082a120a666f757274792074776f"
    );

    let fixed32 = map([
        (MapKey::Fixed32(10), Value::from("ten")),
        (MapKey::Fixed32(15), Value::from("fifteen")),
        (MapKey::Fixed32(42), Value::from("fourty two")),
    ]);
    assert_eq!(
        encode_single(7, FieldKind::map(ScalarType::Fixed32, ScalarType::String), fixed32),
        "3a0a0d0a000000120374656e3a0e0d0f00000012076669667465656e3a110d2a000000120a666f757274792074776f"
    );
}

#[test]
fn test_string_string_map() {
    let kind = FieldKind::map(ScalarType::String, ScalarType::String);
    let value = map([
        ("ben", Value::from("ten")),
        ("sweet", Value::from("fifteen")),
        ("what is the answer?", Value::from("fourty two")),
    ]);
    let expected = "6a0a0a0362656e120374656e6a100a05737765657412076669667465656e6a210a13776861742069732074686520616e737765723f120a666f757274792074776f";
    assert_eq!(encode_single(13, kind.clone(), value.clone()), expected);
    assert_eq!(decode_single(13, kind, expected), value);
}

#[test]
fn test_message_valued_map() {
    let mut registry = registry();
    let descriptor = single_field(
        &mut registry,
        "protoweave.tests.SingleField",
        7,
        FieldKind::map(ScalarType::Fixed32, ElementKind::message(COMPLEX)),
    );
    let s = Serializer::new(registry);
    let value = map([
        (MapKey::Fixed32(10), Value::from(complex(&s, 16, "ten sixteen"))),
        (MapKey::Fixed32(42), Value::from(complex(&s, 10, "fourty two ten sixteen"))),
        (MapKey::Fixed32(65555), Value::from(complex(&s, 10, "WUT?"))),
    ]);
    let message = DynamicMessage::new(descriptor).with("testField", value).unwrap();

    let bytes = s.serialize(&message).unwrap();
    assert_eq!(
        hex::encode(&bytes),
        "3a180d0a00000012110810120d320b74656e207369787465656e3a230d2a000000121c080a12183216666f757274792074776f2074656e207369787465656e3a110d13000100120a080a120632045755543f"
    );
    assert_eq!(s.decode("protoweave.tests.SingleField", &bytes).unwrap(), message);
}

#[test]
fn test_unknown_fields_are_skipped() {
    let s = serializer();
    for data in [
        "120832067177657274793206717765727479",
        "120832067177657274793dcdcccc3d",
        "12083206717765727479419a9999999999b93f",
        "60d3ffffffffffffffff0112083206717765727479",
    ] {
        let message = s.decode(COMPLEX, &unhex(data)).unwrap();
        assert_eq!(complex_parts(&message), (0, "qwerty".to_owned()), "input {}", data);
    }
}
