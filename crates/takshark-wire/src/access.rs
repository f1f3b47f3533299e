//! Type-checked field access.
//!
//! Each accessor reads the first occurrence of a field and checks its wire
//! type. `Ok(None)` means the field is not present; a wire-type disagreement
//! is a [`TypeMismatch`] that callers record and then treat as absent. No
//! accessor coerces between wire types.

use crate::message::{parse_span, FieldMap, MessageWalk, Value};
use crate::tag::WireType;
use crate::varint::zigzag_decode;
use thiserror::Error;

/// A known field arrived with an unexpected wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("field {field} at offset {offset} has wire type {actual}, expected {expected}")]
pub struct TypeMismatch {
    pub field: u32,
    pub offset: usize,
    pub expected: WireType,
    pub actual: WireType,
}

/// Result of looking up one field.
pub type Lookup<T> = Result<Option<T>, TypeMismatch>;

impl<'a> FieldMap<'a> {
    fn typed(&self, number: u32, expected: WireType) -> Lookup<&Value<'a>> {
        let Some(value) = self.get(number).and_then(|f| f.first()) else {
            return Ok(None);
        };
        let actual = value.raw.wire_type();
        if actual != expected {
            return Err(TypeMismatch {
                field: number,
                offset: value.offset,
                expected,
                actual,
            });
        }
        Ok(Some(value))
    }

    pub fn uint64(&self, number: u32) -> Lookup<u64> {
        Ok(self
            .typed(number, WireType::Varint)?
            .and_then(|v| v.raw.as_varint()))
    }

    /// `uint32`, truncating the varint as protobuf does.
    pub fn uint32(&self, number: u32) -> Lookup<u32> {
        Ok(self.uint64(number)?.map(|v| v as u32))
    }

    pub fn int32(&self, number: u32) -> Lookup<i32> {
        Ok(self.uint64(number)?.map(|v| v as i32))
    }

    pub fn int64(&self, number: u32) -> Lookup<i64> {
        Ok(self.uint64(number)?.map(|v| v as i64))
    }

    pub fn sint64(&self, number: u32) -> Lookup<i64> {
        Ok(self.uint64(number)?.map(zigzag_decode))
    }

    pub fn boolean(&self, number: u32) -> Lookup<bool> {
        Ok(self.uint64(number)?.map(|v| v != 0))
    }

    pub fn fixed64(&self, number: u32) -> Lookup<u64> {
        Ok(self
            .typed(number, WireType::Fixed64)?
            .and_then(|v| v.raw.as_fixed64())
            .map(u64::from_le_bytes))
    }

    pub fn fixed32(&self, number: u32) -> Lookup<u32> {
        Ok(self
            .typed(number, WireType::Fixed32)?
            .and_then(|v| v.raw.as_fixed32())
            .map(u32::from_le_bytes))
    }

    pub fn double(&self, number: u32) -> Lookup<f64> {
        Ok(self
            .typed(number, WireType::Fixed64)?
            .and_then(|v| v.raw.as_fixed64())
            .map(f64::from_le_bytes))
    }

    pub fn float(&self, number: u32) -> Lookup<f32> {
        Ok(self
            .typed(number, WireType::Fixed32)?
            .and_then(|v| v.raw.as_fixed32())
            .map(f32::from_le_bytes))
    }

    pub fn bytes(&self, number: u32) -> Lookup<&'a [u8]> {
        Ok(self
            .typed(number, WireType::LengthDelimited)?
            .and_then(|v| v.raw.as_span())
            .map(|span| span.bytes))
    }

    /// UTF-8 string; invalid sequences are replaced rather than rejected.
    pub fn string(&self, number: u32) -> Lookup<String> {
        Ok(self
            .bytes(number)?
            .map(|b| String::from_utf8_lossy(b).into_owned()))
    }

    /// Walk the first occurrence as a nested message.
    pub fn message(&self, number: u32) -> Lookup<MessageWalk<'a>> {
        Ok(self
            .typed(number, WireType::LengthDelimited)?
            .and_then(|v| v.raw.as_span())
            .map(|span| parse_span(self.buffer(), span)))
    }

    /// Walk every occurrence of a repeated message field, in wire order.
    ///
    /// Occurrences with a different wire type than the first are skipped.
    pub fn messages(&self, number: u32) -> Lookup<Vec<MessageWalk<'a>>> {
        if self.typed(number, WireType::LengthDelimited)?.is_none() {
            return Ok(None);
        }
        let walks = self
            .get(number)
            .map(|field| {
                field
                    .values()
                    .iter()
                    .filter_map(|v| v.raw.as_span())
                    .map(|span| parse_span(self.buffer(), span))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(walks))
    }
}
