//! Error types for the protoweave-core library.
//!
//! Decoding failures are split into two families. Stream corruption
//! (bad headers, over-reads, runaway varints) means the byte run cannot be
//! trusted past the failure point. Schema drift (unregistered kinds,
//! mismatched values) means the registry and the data model disagree.
//! Unknown fields are not errors at all; they are skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protoweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all protoweave operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Decoded tag carries an illegal wire type or field number
    #[error(
        "malformed field header at offset {offset}: field number {field_number}, wire type {wire_type}"
    )]
    MalformedHeader {
        /// Byte offset of the header
        offset: usize,
        /// Decoded field number
        field_number: u64,
        /// Decoded wire type bits
        wire_type: u8,
    },

    /// A read would run past the end of the buffer
    #[error("buffer underrun at offset {offset}: needed {needed} bytes, only {available} available")]
    BufferUnderrun {
        /// Byte offset where the read started
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Varint longer than 10 bytes or wider than 64 bits
    #[error("varint overflow at offset {offset}")]
    VarintOverflow {
        /// Byte offset where the varint started
        offset: usize,
    },

    /// No handler is registered for the requested kind
    #[error("no serialization handler registered for {kind}")]
    UnregisteredType {
        /// Display form of the missing kind
        kind: String,
    },

    /// A known field arrived with a wire type its handler cannot read
    #[error("field {field_number}: expected wire type {expected}, found {found}")]
    WireTypeMismatch {
        /// Field number of the offending field
        field_number: u32,
        /// Wire type the handler accepts
        expected: String,
        /// Wire type found on the wire
        found: String,
    },

    /// String payload is not valid UTF-8
    #[error("invalid UTF-8 in string payload at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the payload
        offset: usize,
    },

    /// A value does not match the kind declared for it
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared kind
        expected: String,
        /// Variant actually supplied
        found: String,
    },

    /// Invalid field number in a descriptor
    #[error("invalid field number {number}: must be between 1 and {max}")]
    InvalidFieldNumber {
        /// The invalid field number
        number: u32,
        /// Maximum valid field number
        max: u32,
    },

    /// Two fields of one message share a number
    #[error("duplicate field number {number} in message '{message}'")]
    DuplicateFieldNumber {
        /// Message type name
        message: String,
        /// The repeated field number
        number: u32,
    },

    /// Map registered with a key type protobuf does not allow
    #[error("{kind} cannot be used as a map key")]
    InvalidMapKey {
        /// Display form of the rejected key type
        kind: String,
    },

    /// Property slot outside the message's ordering
    #[error("message '{message}' has no property slot {slot}")]
    UnknownProperty {
        /// Message type name
        message: String,
        /// Requested slot
        slot: usize,
    },

    /// Named field does not exist on the message
    #[error("message '{message}' has no field named '{name}'")]
    NoSuchField {
        /// Message type name
        message: String,
        /// Requested field name
        name: String,
    },

    /// Message nesting exceeded the configured depth
    #[error("recursion limit of {limit} nested messages exceeded")]
    RecursionLimitExceeded {
        /// Configured limit
        limit: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new malformed header error
    pub fn malformed_header(offset: usize, field_number: u64, wire_type: u8) -> Self {
        Self::MalformedHeader {
            offset,
            field_number,
            wire_type,
        }
    }

    /// Creates a new buffer underrun error
    pub fn buffer_underrun(offset: usize, needed: usize, available: usize) -> Self {
        Self::BufferUnderrun {
            offset,
            needed,
            available,
        }
    }

    /// Creates a new varint overflow error
    pub fn varint_overflow(offset: usize) -> Self {
        Self::VarintOverflow { offset }
    }

    /// Creates a new unregistered type error
    pub fn unregistered(kind: impl std::fmt::Display) -> Self {
        Self::UnregisteredType {
            kind: kind.to_string(),
        }
    }

    /// Creates a new wire type mismatch error
    pub fn wire_type_mismatch(
        field_number: u32,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::WireTypeMismatch {
            field_number,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a new type mismatch error
    pub fn type_mismatch(expected: impl std::fmt::Display, found: impl std::fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a new unknown property error
    pub fn unknown_property(message: impl Into<String>, slot: usize) -> Self {
        Self::UnknownProperty {
            message: message.into(),
            slot,
        }
    }

    /// Returns true if the error means the byte stream itself is corrupt
    ///
    /// Fatal errors leave the target object partially applied; decode into a
    /// fresh object and discard it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedHeader { .. }
                | Self::BufferUnderrun { .. }
                | Self::VarintOverflow { .. }
                | Self::WireTypeMismatch { .. }
                | Self::InvalidUtf8 { .. }
                | Self::RecursionLimitExceeded { .. }
        )
    }

    /// Returns true if the error means the registry and data model disagree
    pub fn is_schema_drift(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredType { .. }
                | Self::TypeMismatch { .. }
                | Self::UnknownProperty { .. }
                | Self::NoSuchField { .. }
        )
    }
}
