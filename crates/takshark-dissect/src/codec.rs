//! Stream framing for `tokio_util::codec`.
//!
//! Splits a TCP byte stream into single-message frames: TAK stream frames by
//! their length prefix, XML events through `</event>`, and anything else as
//! whatever is buffered. Frames are handed to [`Dissector::dissect`]
//! unchanged.
//!
//! [`Dissector::dissect`]: crate::Dissector::dissect

use crate::classify::{classify, xml_frame_len, Classification, Transport};
use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::Decoder;
use tracing::warn;

/// Default upper bound on one frame (10 MiB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
}

/// Frames TAK, CoT XML and OMNI traffic on a stream.
#[derive(Debug, Clone)]
pub struct TakFrameCodec {
    max_frame_len: usize,
}

impl TakFrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    fn check(&self, len: usize) -> Result<(), CodecError> {
        if len > self.max_frame_len {
            warn!(len, max = self.max_frame_len, "refusing oversized frame");
            return Err(CodecError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }
        Ok(())
    }
}

impl Default for TakFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl Decoder for TakFrameCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        if src.is_empty() {
            return Ok(None);
        }

        let frame_len = match classify(src, Transport::Stream) {
            Classification::NeedMore { additional } => {
                self.check(src.len().saturating_add(additional))?;
                src.reserve(additional);
                return Ok(None);
            }
            Classification::TakStream { frame_len, .. } => {
                self.check(frame_len)?;
                frame_len
            }
            Classification::Xml => match xml_frame_len(src) {
                Some(len) => len,
                None => {
                    self.check(src.len())?;
                    return Ok(None);
                }
            },
            Classification::TakMesh { .. }
            | Classification::Omni
            | Classification::Malformed { .. }
            | Classification::Unrecognized => src.len(),
        };

        Ok(Some(src.split_to(frame_len).freeze()))
    }

    /// Flush whatever is left when the peer closes, so a truncated frame
    /// still reaches the dissector.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Ok(Some(src.split().freeze())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments() {
        let mut codec = TakFrameCodec::default();
        let mut buf = BytesMut::from(&[0xBF, 0x04, 0x08][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[0x01, 0x10, 0x02]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &[0xBF, 0x04, 0x08, 0x01, 0x10, 0x02]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut codec = TakFrameCodec::default();
        let mut buf = BytesMut::from(&[0xBF, 0x02, 0x08, 0x01, 0xBF, 0x02, 0x08, 0x02][..]);

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], &[0xBF, 0x02, 0x08, 0x01]);
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second[..], &[0xBF, 0x02, 0x08, 0x02]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_xml_waits_for_end_token() {
        let mut codec = TakFrameCodec::default();
        let mut buf = BytesMut::from(&b"<event uid=\"a\"><point"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b" lat=\"1\"/></event><event");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(frame.ends_with(b"</event>"));
        assert_eq!(&buf[..], b"<event");
    }

    #[test]
    fn test_self_closing_event_is_one_frame() {
        let mut codec = TakFrameCodec::default();
        let mut buf = BytesMut::from(&br#"<event uid="A"/>"#[..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], br#"<event uid="A"/>"#);
        assert!(buf.is_empty());

        buf.extend_from_slice(br#"<event uid="B"/><event uid="C"></event>"#);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], br#"<event uid="B"/>"#);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], br#"<event uid="C"></event>"#);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut codec = TakFrameCodec::new(64);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0xBF, 0xC8, 0x01]); // length 200
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::FrameTooLarge { len: 203, max: 64 })
        ));
    }

    #[test]
    fn test_eof_flushes_partial_frame() {
        let mut codec = TakFrameCodec::default();
        let mut buf = BytesMut::from(&[0xBF, 0x09, 0x08][..]);
        let frame = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &[0xBF, 0x09, 0x08]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }
}
