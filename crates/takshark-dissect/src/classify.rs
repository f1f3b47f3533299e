//! Byte-level format classification and TAK frame boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use takshark_cot::xml::{event_len, is_xml};
use takshark_wire::{decode_varint, WireError};

/// First byte of every TAK protocol frame
pub const TAK_MAGIC: u8 = 0xBF;

/// Leading bytes accepted as the start of an OMNI BaseEvent.
///
/// 0x08 entity_id, 0x10, 0x12 event origin, 0x1A, 0x22 time of validity.
pub const OMNI_LEADING_TAGS: [u8; 5] = [0x08, 0x10, 0x12, 0x1A, 0x22];

/// How the buffer was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// TCP: a message may span buffers or share one with the next
    Stream,
    /// UDP: one buffer is one message
    Datagram,
}

/// Wire format label attached to every decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Format {
    Xml,
    TakStream,
    TakMesh { version: u64 },
    Omni,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xml => f.write_str("XML"),
            Format::TakStream => f.write_str("TAK-Stream"),
            Format::TakMesh { version } => write!(f, "TAK-Mesh v{version}"),
            Format::Omni => f.write_str("OMNI"),
        }
    }
}

/// Result of looking at the first bytes of a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Xml,
    /// Length-prefixed frame; the payload is `header_len..frame_len`
    TakStream { header_len: usize, frame_len: usize },
    /// Versioned frame; the payload is `header_len..` to the end of the buffer
    TakMesh { version: u64, header_len: usize },
    Omni,
    /// Stream transports only: the frame is incomplete
    NeedMore { additional: usize },
    /// The TAK header is unreadable, or a datagram is shorter than its frame
    Malformed { format: Option<Format>, error: WireError },
    Unrecognized,
}

/// Classify a buffer without decoding any payload.
pub fn classify(buf: &[u8], transport: Transport) -> Classification {
    if buf.is_empty() {
        return match transport {
            Transport::Stream => Classification::NeedMore { additional: 1 },
            Transport::Datagram => Classification::Unrecognized,
        };
    }
    if is_xml(buf) {
        return Classification::Xml;
    }
    if buf[0] == TAK_MAGIC {
        return classify_tak(buf, transport);
    }
    if OMNI_LEADING_TAGS.contains(&buf[0]) {
        return Classification::Omni;
    }
    Classification::Unrecognized
}

fn classify_tak(buf: &[u8], transport: Transport) -> Classification {
    let (length_or_version, k) = match decode_varint(buf, 1) {
        Ok(decoded) => decoded,
        Err(error) if error.is_truncation() && transport == Transport::Stream => {
            return Classification::NeedMore { additional: 1 };
        }
        Err(error) => return Classification::Malformed { format: None, error },
    };

    let header_len = 1 + k;
    if buf.get(header_len) == Some(&TAK_MAGIC) {
        return Classification::TakMesh {
            version: length_or_version,
            header_len: header_len + 1,
        };
    }

    let available = buf.len() - header_len;
    let frame_len = usize::try_from(length_or_version)
        .ok()
        .and_then(|len| len.checked_add(header_len));

    match frame_len {
        Some(frame_len) if frame_len <= buf.len() => Classification::TakStream {
            header_len,
            frame_len,
        },
        _ if transport == Transport::Stream => Classification::NeedMore {
            additional: frame_len.map_or(usize::MAX, |len| len - buf.len()),
        },
        _ => Classification::Malformed {
            format: Some(Format::TakStream),
            error: WireError::LengthOverrun {
                offset: 1,
                declared: length_or_version,
                available,
            },
        },
    }
}

/// Length of the first XML event in a stream buffer: through `/>` for a
/// self-closing event, else through `</event>`.
pub fn xml_frame_len(buf: &[u8]) -> Option<usize> {
    event_len(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tak_stream() {
        assert_eq!(
            classify(&[0xBF, 0x02, 0x08, 0x01], Transport::Stream),
            Classification::TakStream {
                header_len: 2,
                frame_len: 4
            }
        );
        assert_eq!(
            classify(&[0xBF, 0x02, 0x08, 0x01], Transport::Datagram),
            Classification::TakStream {
                header_len: 2,
                frame_len: 4
            }
        );
    }

    #[test]
    fn test_tak_mesh() {
        assert_eq!(
            classify(&[0xBF, 0x03, 0xBF, 0x08, 0x01], Transport::Datagram),
            Classification::TakMesh {
                version: 3,
                header_len: 3
            }
        );
    }

    #[test]
    fn test_xml_and_omni() {
        assert_eq!(
            classify(b"<?xml version=\"1.0\"?><event/>", Transport::Datagram),
            Classification::Xml
        );
        assert_eq!(
            classify(b"\n  <event uid=\"x\"/>", Transport::Stream),
            Classification::Xml
        );
        assert_eq!(
            classify(&[0x08, 0xB9, 0x60], Transport::Datagram),
            Classification::Omni
        );
        for tag in OMNI_LEADING_TAGS {
            assert_eq!(classify(&[tag], Transport::Datagram), Classification::Omni);
        }
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            classify(&[0x00, 0x01], Transport::Datagram),
            Classification::Unrecognized
        );
        assert_eq!(
            classify(b"GET / HTTP/1.1\r\n", Transport::Stream),
            Classification::Unrecognized
        );
        assert_eq!(classify(b"<html>", Transport::Datagram), Classification::Unrecognized);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(classify(&[], Transport::Datagram), Classification::Unrecognized);
        assert_eq!(
            classify(&[], Transport::Stream),
            Classification::NeedMore { additional: 1 }
        );
    }

    #[test]
    fn test_short_frame() {
        assert_eq!(
            classify(&[0xBF, 0x05, 0x08], Transport::Stream),
            Classification::NeedMore { additional: 4 }
        );
        match classify(&[0xBF, 0x05, 0x08], Transport::Datagram) {
            Classification::Malformed { format, error } => {
                assert_eq!(format, Some(Format::TakStream));
                assert_eq!(
                    error,
                    WireError::LengthOverrun {
                        offset: 1,
                        declared: 5,
                        available: 1
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(
            classify(&[0xBF], Transport::Stream),
            Classification::NeedMore { additional: 1 }
        );
        assert_eq!(
            classify(&[0xBF, 0x80], Transport::Stream),
            Classification::NeedMore { additional: 1 }
        );
        assert!(matches!(
            classify(&[0xBF, 0x80], Transport::Datagram),
            Classification::Malformed { format: None, .. }
        ));
    }

    #[test]
    fn test_overlong_header_is_malformed_on_streams() {
        let mut buf = vec![0xBF];
        buf.extend_from_slice(&[0xFF; 10]);
        buf.push(0x01);
        assert!(matches!(
            classify(&buf, Transport::Stream),
            Classification::Malformed {
                error: WireError::VarintOverflow { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_huge_declared_length_on_stream() {
        // length 2^63, far beyond anything addressable
        let mut buf = vec![0xBF];
        takshark_wire::put_varint(&mut buf, 1 << 63);
        match classify(&buf, Transport::Stream) {
            Classification::NeedMore { additional } => assert!(additional > 1 << 40),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_xml_frame_len() {
        let buf = b"<event uid=\"a\"></event><event uid=\"b\"/>";
        assert_eq!(xml_frame_len(buf), Some(23));
        assert_eq!(xml_frame_len(b"<event uid=\"a\">"), None);
    }

    #[test]
    fn test_xml_frame_len_self_closing_first() {
        let buf = br#"<event uid="A"/><event uid="B"><point lat="1"/></event>"#;
        assert_eq!(xml_frame_len(buf), Some(16));
        assert_eq!(xml_frame_len(&buf[16..]), Some(buf.len() - 16));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::TakMesh { version: 1 }.to_string(), "TAK-Mesh v1");
        assert_eq!(Format::TakStream.to_string(), "TAK-Stream");
        assert_eq!(Format::Xml.to_string(), "XML");
        assert_eq!(Format::Omni.to_string(), "OMNI");
    }
}
