//! Protobuf wire-format primitives and a schema-less message walker.
//!
//! The decoders here never trust a length they have not checked against the
//! buffer, never allocate in proportion to one, and report every failure with
//! the absolute offset where decoding stopped.
//!
//! - **Codecs**: varint, zigzag, fixed-width, tag and length-delimited.
//! - **Walker**: [`parse_message`] builds a [`FieldMap`] without a schema,
//!   keeping unknown and repeated fields.
//! - **Access**: type-checked reads out of a [`FieldMap`] plus
//!   [`Diagnostics`] for recording what was skipped.
//!
//! # Example
//!
//! ```rust
//! use takshark_wire::{parse_all, WireType};
//!
//! // field 1 = "a-f-G", field 6 = 1700000000000
//! let buf = [
//!     0x0A, 0x05, b'a', b'-', b'f', b'-', b'G',
//!     0x30, 0x80, 0xD0, 0x95, 0xFF, 0xBC, 0x31,
//! ];
//! let walk = parse_all(&buf);
//! assert!(walk.error.is_none());
//!
//! let fields = walk.fields;
//! assert_eq!(fields.get(1).unwrap().wire_type(), WireType::LengthDelimited);
//! assert_eq!(fields.string(1).unwrap().as_deref(), Some("a-f-G"));
//! assert_eq!(fields.uint64(6).unwrap(), Some(1_700_000_000_000));
//! ```

pub mod access;
pub mod delimited;
pub mod diagnostics;
pub mod error;
pub mod fixed;
pub mod message;
pub mod tag;
pub mod varint;

pub use access::{Lookup, TypeMismatch};
pub use delimited::{decode_length_delimited, Span};
pub use diagnostics::{Diagnostics, Issue};
pub use error::{ErrorClass, WireError};
pub use fixed::{decode_double, decode_fixed32, decode_fixed64, decode_float};
pub use message::{parse_all, parse_message, parse_span, Field, FieldMap, MessageWalk, RawValue, Value};
pub use tag::{decode_tag, encode_tag, put_tag, Tag, WireType, MAX_FIELD_NUMBER};
pub use varint::{
    decode_varint, decode_zigzag_varint, encode_varint, encoded_len, put_varint, zigzag_decode,
    zigzag_encode,
};
