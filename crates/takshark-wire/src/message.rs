//! Schema-less message walker.
//!
//! [`parse_message`] turns a region of a buffer into a [`FieldMap`]: field
//! number to wire type plus every value seen for it, in wire order. Unknown
//! field numbers are kept like any other. Length-delimited values borrow
//! from the buffer, so nested messages are walked in place and every offset
//! reported is absolute.

use crate::delimited::{decode_length_delimited, Span};
use crate::error::WireError;
use crate::fixed::read_array;
use crate::tag::{decode_tag, WireType};
use crate::varint::decode_varint;
use std::collections::BTreeMap;

/// One undecoded value as it appeared on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Varint(u64),
    Fixed64([u8; 8]),
    LengthDelimited(Span<'a>),
    Fixed32([u8; 4]),
}

impl<'a> RawValue<'a> {
    pub fn wire_type(&self) -> WireType {
        match self {
            RawValue::Varint(_) => WireType::Varint,
            RawValue::Fixed64(_) => WireType::Fixed64,
            RawValue::LengthDelimited(_) => WireType::LengthDelimited,
            RawValue::Fixed32(_) => WireType::Fixed32,
        }
    }

    pub fn as_varint(&self) -> Option<u64> {
        match self {
            RawValue::Varint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_span(&self) -> Option<Span<'a>> {
        match self {
            RawValue::LengthDelimited(span) => Some(*span),
            _ => None,
        }
    }

    pub fn as_fixed64(&self) -> Option<[u8; 8]> {
        match self {
            RawValue::Fixed64(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_fixed32(&self) -> Option<[u8; 4]> {
        match self {
            RawValue::Fixed32(b) => Some(*b),
            _ => None,
        }
    }
}

/// A value plus the offset of the tag that introduced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Value<'a> {
    pub offset: usize,
    pub raw: RawValue<'a>,
}

/// Every occurrence of one field number.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    number: u32,
    wire_type: WireType,
    values: Vec<Value<'a>>,
}

impl<'a> Field<'a> {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Wire type of the first occurrence.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// All values in wire order. Never empty.
    pub fn values(&self) -> &[Value<'a>] {
        &self.values
    }

    pub fn first(&self) -> Option<&Value<'a>> {
        self.values.first()
    }

    pub fn is_repeated(&self) -> bool {
        self.values.len() > 1
    }
}

/// Decoded message: field number to its values.
///
/// Distinct field numbers iterate in first-seen wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap<'a> {
    buf: &'a [u8],
    fields: Vec<Field<'a>>,
    index: BTreeMap<u32, usize>,
}

impl<'a> FieldMap<'a> {
    /// Creates an empty map over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            fields: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// The buffer nested messages are resolved against.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn get(&self, number: u32) -> Option<&Field<'a>> {
        self.index.get(&number).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, number: u32) -> bool {
        self.index.contains_key(&number)
    }

    /// Number of distinct field numbers.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter()
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.fields.iter().map(|f| f.number)
    }

    fn push(&mut self, number: u32, value: Value<'a>) {
        match self.index.get(&number) {
            Some(&i) => self.fields[i].values.push(value),
            None => {
                self.index.insert(number, self.fields.len());
                self.fields.push(Field {
                    number,
                    wire_type: value.raw.wire_type(),
                    values: vec![value],
                });
            }
        }
    }
}

/// Result of walking one message region.
///
/// `fields` holds everything decoded before `error`, if any, stopped the
/// walk.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageWalk<'a> {
    pub fields: FieldMap<'a>,
    pub error: Option<WireError>,
}

impl<'a> MessageWalk<'a> {
    pub fn is_malformed(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> Result<FieldMap<'a>, (FieldMap<'a>, WireError)> {
        match self.error {
            None => Ok(self.fields),
            Some(err) => Err((self.fields, err)),
        }
    }
}

/// Walk the `length` bytes of `buf` starting at `offset`.
///
/// The walk must land exactly on `offset + length`. A value that would end
/// past that boundary stops the walk with [`WireError::BoundaryOverrun`]; one
/// that runs off the end of `buf` stops it with a truncation error.
pub fn parse_message(buf: &[u8], offset: usize, length: usize) -> MessageWalk<'_> {
    let mut fields = FieldMap::new(buf);

    let boundary = match offset.checked_add(length) {
        Some(end) if end <= buf.len() => end,
        _ => {
            return MessageWalk {
                fields,
                error: Some(WireError::LengthOverrun {
                    offset,
                    declared: length as u64,
                    available: buf.len().saturating_sub(offset),
                }),
            }
        }
    };

    let mut pos = offset;
    while pos < boundary {
        match read_field(buf, pos, boundary) {
            Ok((number, raw, next)) => {
                fields.push(number, Value { offset: pos, raw });
                pos = next;
            }
            Err(err) => {
                tracing::trace!(offset = err.offset(), error = %err, "message walk stopped");
                return MessageWalk {
                    fields,
                    error: Some(err),
                };
            }
        }
    }

    MessageWalk {
        fields,
        error: None,
    }
}

/// Walk an entire buffer as one message.
pub fn parse_all(buf: &[u8]) -> MessageWalk<'_> {
    parse_message(buf, 0, buf.len())
}

/// Walk a nested message whose bytes are `span`.
pub fn parse_span<'a>(buf: &'a [u8], span: Span<'a>) -> MessageWalk<'a> {
    parse_message(buf, span.offset, span.len())
}

fn read_field(buf: &[u8], pos: usize, boundary: usize) -> Result<(u32, RawValue<'_>, usize), WireError> {
    let (tag, tag_len) = decode_tag(buf, pos)?;
    let value_at = pos + tag_len;
    within(pos, value_at, boundary)?;

    let (raw, value_len) = match tag.wire_type {
        WireType::Varint => {
            let (v, n) = decode_varint(buf, value_at)?;
            (RawValue::Varint(v), n)
        }
        WireType::Fixed64 => (RawValue::Fixed64(read_array(buf, value_at, "fixed64")?), 8),
        WireType::Fixed32 => (RawValue::Fixed32(read_array(buf, value_at, "fixed32")?), 4),
        WireType::LengthDelimited => {
            let (span, n) = decode_length_delimited(buf, value_at)?;
            (RawValue::LengthDelimited(span), n)
        }
    };

    let end = value_at + value_len;
    within(value_at, end, boundary)?;
    Ok((tag.field_number, raw, end))
}

fn within(offset: usize, end: usize, boundary: usize) -> Result<(), WireError> {
    if end > boundary {
        Err(WireError::BoundaryOverrun {
            offset,
            end,
            boundary,
        })
    } else {
        Ok(())
    }
}
