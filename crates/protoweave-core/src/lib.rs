//! # protoweave-core
//!
//! A Protocol Buffers binary wire-format codec driven by runtime descriptors.
//!
//! This crate provides the core functionality for:
//! - Encoding and decoding varints, ZigZag integers, fixed-width values and field headers
//! - Walking untrusted input through a bounds-checked cursor
//! - Serializing messages field by field through a registry of per-kind handlers
//! - Repeated fields (packed and unpacked), maps and nested messages
//! - Inspecting wire data without a schema
//! - The `google.protobuf` well-known types, ready to register
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Varint, ZigZag and tag codecs, [`Cursor`] and [`Writer`]
//! - [`schema`]: Field kinds and message descriptors
//! - [`value`]: The dynamically-typed [`Value`] container
//! - [`message`]: The [`Message`] property-access trait and [`DynamicMessage`]
//! - [`serializer`]: Handler [`Registry`] and the [`Serializer`] itself
//! - [`raw`]: Schema-less decoding
//! - [`well_known`]: Descriptors for the `google.protobuf` well-known types
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use protoweave_core::schema::{FieldKind, MessageDescriptor, ScalarType};
//! use protoweave_core::{DynamicMessage, Registry, Serializer, Value};
//!
//! let descriptor = MessageDescriptor::builder("example.Tagged")
//!     .field(1, "name", ScalarType::String)
//!     .field(2, "scores", FieldKind::list(ScalarType::Int32))
//!     .build()?;
//!
//! let mut registry = Registry::new();
//! registry.register_message(descriptor.clone())?;
//! let serializer = Serializer::new(registry);
//!
//! let message = DynamicMessage::new(descriptor)
//!     .with("name", "abc")?
//!     .with("scores", vec![Value::Int32(1), Value::Int32(2)])?;
//!
//! let bytes = serializer.serialize(&message)?;
//! assert_eq!(bytes.as_ref(), b"\x0a\x03abc\x12\x02\x01\x02");
//! assert_eq!(serializer.decode("example.Tagged", &bytes)?, message);
//! # Ok::<(), protoweave_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`Message`]: Expose your own types to the serializer
//! - [`SerializationHandler`]: Register custom encodings for a [`schema::FieldKind`]

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod message;
pub mod raw;
pub mod schema;
pub mod serializer;
pub mod value;
pub mod well_known;
pub mod wire;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use message::{DynamicMessage, Message};
pub use raw::{decode_raw, RawField, RawMessage, RawValue};
pub use serializer::{Context, Registry, SerializationHandler, Serializer, SerializerConfig};
pub use value::{MapKey, Value};
pub use wire::{Cursor, FieldTag, WireType, Writer, MAX_FIELD_NUMBER};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
