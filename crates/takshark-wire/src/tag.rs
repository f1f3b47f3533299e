//! Field tags: `(field_number << 3) | wire_type` encoded as a varint.

use crate::error::WireError;
use crate::varint::{decode_varint, put_varint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest field number protobuf allows (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Wire types this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Numeric wire-type code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Varint => write!(f, "VARINT"),
            WireType::Fixed64 => write!(f, "FIXED64"),
            WireType::LengthDelimited => write!(f, "LENGTH_DELIMITED"),
            WireType::Fixed32 => write!(f, "FIXED32"),
        }
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub field_number: u32,
    pub wire_type: WireType,
}

/// Decode a tag at `offset`.
///
/// Field number 0 and the group wire types (3, 4) are rejected as
/// unsupported; wire types 6 and 7 are rejected as malformed.
pub fn decode_tag(buf: &[u8], offset: usize) -> Result<(Tag, usize), WireError> {
    let (raw, consumed) = decode_varint(buf, offset)?;
    let field_number = raw >> 3;
    let code = (raw & 0x7) as u8;

    if field_number == 0 {
        return Err(WireError::ZeroFieldNumber { offset });
    }
    if field_number > u64::from(MAX_FIELD_NUMBER) {
        return Err(WireError::FieldNumberOutOfRange {
            field_number,
            offset,
        });
    }

    let wire_type = match code {
        3 | 4 => {
            return Err(WireError::GroupWireType {
                wire_type: code,
                offset,
            })
        }
        other => WireType::from_code(other).ok_or(WireError::InvalidWireType {
            wire_type: other,
            offset,
        })?,
    };

    Ok((
        Tag {
            field_number: field_number as u32,
            wire_type,
        },
        consumed,
    ))
}

/// Append the tag for `field_number` / `wire_type`.
pub fn put_tag(out: &mut Vec<u8>, field_number: u32, wire_type: WireType) {
    put_varint(out, (u64::from(field_number) << 3) | u64::from(wire_type.code()));
}

pub fn encode_tag(field_number: u32, wire_type: WireType) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    put_tag(&mut out, field_number, wire_type);
    out
}
