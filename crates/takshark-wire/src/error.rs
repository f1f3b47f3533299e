//! Error types for wire-level decoding.
//!
//! Every failure carries the absolute buffer offset at which decoding gave up,
//! so the caller can point at the offending byte.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Corrupt or truncated bytes. Decoding of the message stops.
    Malformed,
    /// Plausible bytes using an encoding or field this decoder does not handle.
    Unsupported,
}

/// Failures raised by the primitive codecs and the message walker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended before the value was complete
    #[error("insufficient data decoding {op} at offset {offset}")]
    Truncated { op: &'static str, offset: usize },

    /// More than ten bytes carried the continuation bit
    #[error("varint at offset {offset} is longer than 10 bytes")]
    VarintOverflow { offset: usize },

    /// Field number 0 is reserved
    #[error("reserved field number 0 at offset {offset}")]
    ZeroFieldNumber { offset: usize },

    /// Field number beyond the 29-bit protobuf range
    #[error("field number {field_number} at offset {offset} is out of range")]
    FieldNumberOutOfRange { field_number: u64, offset: usize },

    /// Deprecated start/end group wire types
    #[error("unsupported group wire type {wire_type} at offset {offset}")]
    GroupWireType { wire_type: u8, offset: usize },

    /// Wire types 6 and 7 are undefined
    #[error("invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType { wire_type: u8, offset: usize },

    /// A declared length runs past the end of the buffer
    #[error("length {declared} at offset {offset} overruns the buffer ({available} bytes available)")]
    LengthOverrun {
        offset: usize,
        declared: u64,
        available: usize,
    },

    /// A value decoded inside the buffer but ends past its enclosing message
    #[error("value at offset {offset} ends at {end}, past the message boundary at {boundary}")]
    BoundaryOverrun {
        offset: usize,
        end: usize,
        boundary: usize,
    },
}

impl WireError {
    /// Creates a truncation error.
    pub fn truncated(op: &'static str, offset: usize) -> Self {
        Self::Truncated { op, offset }
    }

    /// Offset of the first byte of the value that failed to decode.
    pub fn offset(&self) -> usize {
        match self {
            Self::Truncated { offset, .. }
            | Self::VarintOverflow { offset }
            | Self::ZeroFieldNumber { offset }
            | Self::FieldNumberOutOfRange { offset, .. }
            | Self::GroupWireType { offset, .. }
            | Self::InvalidWireType { offset, .. }
            | Self::LengthOverrun { offset, .. }
            | Self::BoundaryOverrun { offset, .. } => *offset,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ZeroFieldNumber { .. } | Self::GroupWireType { .. } => ErrorClass::Unsupported,
            _ => ErrorClass::Malformed,
        }
    }

    /// True when the buffer itself ran out, as opposed to a value overshooting
    /// its enclosing message.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. } | Self::LengthOverrun { .. })
    }
}
