//! Classification and dissection of TAK, CoT XML and OMNI traffic
//!
//! [`Dissector::dissect`] takes one buffer plus its [`Transport`] and returns
//! a [`Dissection`]: a decoded record, a request for more bytes, a malformed
//! frame with whatever could be projected, or an unsupported buffer with a
//! short preview. Nothing here keeps state between calls; a stream caller
//! re-offers the buffer once more bytes arrive, or uses [`TakFrameCodec`] to
//! cut frames first.
//!
//! # Example
//!
//! ```rust
//! use takshark_dissect::{Dissection, Dissector, Format, Transport};
//!
//! let dissector = Dissector::default();
//!
//! let outcome = dissector.dissect(&[0xBF, 0x02, 0x12, 0x00], Transport::Stream);
//! assert_eq!(outcome.format(), Some(Format::TakStream));
//!
//! let outcome = dissector.dissect(&[0xBF, 0x05, 0x12], Transport::Stream);
//! assert_eq!(outcome, Dissection::NeedMore { additional: 4 });
//! ```

pub mod classify;
pub mod codec;
pub mod dissector;
pub mod raw;

pub use classify::{classify, Classification, Format, Transport, OMNI_LEADING_TAGS, TAK_MAGIC};
pub use codec::{CodecError, TakFrameCodec, DEFAULT_MAX_FRAME_LEN};
pub use dissector::{DissectOptions, Dissection, Dissector, Record};
pub use raw::{raw_fields, RawEntry, RawField};
