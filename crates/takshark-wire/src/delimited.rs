//! Length-prefixed byte ranges.

use crate::error::WireError;
use crate::varint::decode_varint;

/// A borrowed byte range that remembers where it sits in the parent buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    /// Absolute offset of the first byte in the buffer the span came from
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> Span<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Absolute offset one past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

/// Decode a varint length followed by that many bytes.
///
/// Returns the range and the total number of bytes consumed (prefix plus
/// payload). The declared length is checked against the remaining buffer
/// before anything is sliced; an overrun yields no partial result.
pub fn decode_length_delimited(buf: &[u8], offset: usize) -> Result<(Span<'_>, usize), WireError> {
    let (declared, prefix_len) = decode_varint(buf, offset).map_err(|err| match err {
        WireError::Truncated { offset, .. } => WireError::truncated("length prefix", offset),
        other => other,
    })?;

    let start = offset + prefix_len;
    let available = buf.len().saturating_sub(start);
    let len = usize::try_from(declared)
        .ok()
        .filter(|len| *len <= available)
        .ok_or(WireError::LengthOverrun {
            offset,
            declared,
            available,
        })?;

    let span = Span {
        offset: start,
        bytes: &buf[start..start + len],
    };
    Ok((span, prefix_len + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string() {
        let buf = [0x05, b'h', b'e', b'l', b'l', b'o'];
        let (span, consumed) = decode_length_delimited(&buf, 0).unwrap();
        assert_eq!(span.bytes, b"hello");
        assert_eq!(span.offset, 1);
        assert_eq!(span.len(), 5);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_two_byte_length_prefix() {
        let mut buf = vec![0xD1, 0x01];
        buf.extend(std::iter::repeat(0x41).take(209));
        let (span, consumed) = decode_length_delimited(&buf, 0).unwrap();
        assert_eq!(span.len(), 209);
        assert_eq!(span.end(), 211);
        assert_eq!(consumed, 211);
    }

    #[test]
    fn test_empty_range() {
        let (span, consumed) = decode_length_delimited(&[0x00], 0).unwrap();
        assert!(span.is_empty());
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_length_overrun() {
        let buf = [10, 1, 2, 3, 4, 5];
        assert_eq!(
            decode_length_delimited(&buf, 0),
            Err(WireError::LengthOverrun {
                offset: 0,
                declared: 10,
                available: 5
            })
        );
    }

    #[test]
    fn test_huge_declared_length() {
        let mut buf = crate::varint::encode_varint(u64::MAX);
        buf.push(0x00);
        assert!(matches!(
            decode_length_delimited(&buf, 0),
            Err(WireError::LengthOverrun { .. })
        ));
    }

    #[test]
    fn test_truncated_prefix() {
        assert_eq!(
            decode_length_delimited(&[0x80], 0),
            Err(WireError::truncated("length prefix", 0))
        );
    }
}
