//! Base-128 varints and zigzag-encoded signed varints.

use crate::error::WireError;

/// Longest varint that can carry a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Decode an unsigned varint starting at `offset`.
///
/// Returns the value and the number of bytes it occupied. Fails if the buffer
/// ends while the continuation bit is still set, or if the value does not
/// fit in 64 bits.
pub fn decode_varint(buf: &[u8], offset: usize) -> Result<(u64, usize), WireError> {
    let rest = buf.get(offset..).unwrap_or_default();
    let mut value = 0u64;

    for (i, &byte) in rest.iter().take(MAX_VARINT_LEN).enumerate() {
        // The tenth byte holds only bit 63.
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(WireError::VarintOverflow { offset });
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if rest.len() >= MAX_VARINT_LEN {
        Err(WireError::VarintOverflow { offset })
    } else {
        Err(WireError::truncated("varint", offset))
    }
}

/// Decode a zigzag varint (protobuf `sint32`/`sint64`).
pub fn decode_zigzag_varint(buf: &[u8], offset: usize) -> Result<(i64, usize), WireError> {
    let (raw, consumed) = decode_varint(buf, offset)?;
    Ok((zigzag_decode(raw), consumed))
}

/// Map 0, 1, 2, 3, 4 to 0, -1, 1, -2, 2.
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Inverse of [`zigzag_decode`].
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Number of bytes `value` occupies as a varint.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Append `value` as a varint.
pub fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80;
        }

        out.push(byte);

        if value == 0 {
            break;
        }
    }
}

/// Encode `value` as a standalone varint.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    put_varint(&mut out, value);
    out
}
