//! Owned, serializable view of a generic field map.
//!
//! Used to show fields the schema projectors do not read. Length-delimited
//! values are shown as text when they are printable UTF-8, as a nested field
//! list when they walk cleanly as a message, and as hex otherwise.

use serde::Serialize;
use takshark_wire::{parse_span, FieldMap, RawValue, Span, WireType};

/// Nesting limit for length-delimited values shown as messages
pub const MAX_RAW_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawField {
    pub number: u32,
    pub wire_type: WireType,
    pub values: Vec<RawEntry>,
}

/// One occurrence of a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawEntry {
    Varint { offset: usize, value: u64 },
    Fixed64 { offset: usize, hex: String },
    Fixed32 { offset: usize, hex: String },
    Text { offset: usize, value: String },
    Message { offset: usize, fields: Vec<RawField> },
    Bytes { offset: usize, hex: String },
}

impl RawEntry {
    pub fn offset(&self) -> usize {
        match self {
            RawEntry::Varint { offset, .. }
            | RawEntry::Fixed64 { offset, .. }
            | RawEntry::Fixed32 { offset, .. }
            | RawEntry::Text { offset, .. }
            | RawEntry::Message { offset, .. }
            | RawEntry::Bytes { offset, .. } => *offset,
        }
    }
}

/// Every field of `fields`, in first-seen wire order.
pub fn raw_fields(fields: &FieldMap<'_>) -> Vec<RawField> {
    raw_fields_at(fields, 0)
}

fn raw_fields_at(fields: &FieldMap<'_>, depth: usize) -> Vec<RawField> {
    fields
        .iter()
        .map(|field| RawField {
            number: field.number(),
            wire_type: field.wire_type(),
            values: field
                .values()
                .iter()
                .map(|value| match value.raw {
                    RawValue::Varint(v) => RawEntry::Varint {
                        offset: value.offset,
                        value: v,
                    },
                    RawValue::Fixed64(bytes) => RawEntry::Fixed64 {
                        offset: value.offset,
                        hex: hex::encode(bytes),
                    },
                    RawValue::Fixed32(bytes) => RawEntry::Fixed32 {
                        offset: value.offset,
                        hex: hex::encode(bytes),
                    },
                    RawValue::LengthDelimited(span) => {
                        delimited(fields.buffer(), value.offset, span, depth)
                    }
                })
                .collect(),
        })
        .collect()
}

fn delimited(buf: &[u8], offset: usize, span: Span<'_>, depth: usize) -> RawEntry {
    if let Some(text) = printable(span.bytes) {
        return RawEntry::Text {
            offset,
            value: text.to_string(),
        };
    }
    if depth < MAX_RAW_DEPTH && !span.is_empty() {
        let walk = parse_span(buf, span);
        if walk.error.is_none() && !walk.fields.is_empty() {
            return RawEntry::Message {
                offset,
                fields: raw_fields_at(&walk.fields, depth + 1),
            };
        }
    }
    RawEntry::Bytes {
        offset,
        hex: hex::encode(span.bytes),
    }
}

fn printable(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    let ok = !text.is_empty() && text.chars().all(|c| !c.is_control() || c == '\n' || c == '\t');
    ok.then_some(text)
}
