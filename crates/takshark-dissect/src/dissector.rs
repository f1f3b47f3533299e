//! Dissection entry point: classify, walk, project.

use crate::classify::{classify, xml_frame_len, Classification, Format, Transport};
use crate::raw::{raw_fields, RawField};
use serde::{Serialize, Serializer};
use takshark_cot::{decode_cot_xml, project_tak_message, CotEvent, TakMessage};
use takshark_omni::{project_base_event, BaseEvent};
use takshark_wire::{parse_message, Diagnostics, ErrorClass, FieldMap, Issue};
use tracing::debug;

/// Per-dissector settings, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DissectOptions {
    /// Raw bytes kept in an [`Dissection::Unsupported`] preview
    pub preview_bytes: usize,
    /// Attach the generic field map to decoded binary records
    pub raw_fields: bool,
}

impl Default for DissectOptions {
    fn default() -> Self {
        Self {
            preview_bytes: 16,
            raw_fields: false,
        }
    }
}

/// A projected record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "schema", content = "body", rename_all = "snake_case")]
pub enum Record {
    /// CoT XML event
    Cot(CotEvent),
    /// TAK protobuf payload of a stream or mesh frame
    Tak(TakMessage),
    /// OMNI BaseEvent
    Omni(BaseEvent),
}

/// Outcome of dissecting one buffer.
///
/// Offsets are relative to the buffer passed to [`Dissector::dissect`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Dissection {
    Decoded {
        format: Format,
        record: Record,
        /// Bytes of the buffer belonging to this message
        consumed: usize,
        /// Fields skipped or ignored while projecting
        warnings: Vec<Issue>,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw: Option<Vec<RawField>>,
    },
    /// Stream transports only: re-offer the buffer with `additional` more bytes
    NeedMore { additional: usize },
    Malformed {
        format: Option<Format>,
        reason: String,
        /// Where decoding gave up
        offset: usize,
        consumed: usize,
        /// Whatever was projected before decoding stopped
        partial: Option<Record>,
    },
    Unsupported {
        reason: String,
        #[serde(serialize_with = "serialize_hex")]
        preview: Vec<u8>,
        consumed: usize,
    },
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

impl Dissection {
    /// Bytes to drop before offering the rest of a stream; `None` for
    /// [`Dissection::NeedMore`].
    pub fn consumed(&self) -> Option<usize> {
        match self {
            Dissection::Decoded { consumed, .. }
            | Dissection::Malformed { consumed, .. }
            | Dissection::Unsupported { consumed, .. } => Some(*consumed),
            Dissection::NeedMore { .. } => None,
        }
    }

    pub fn format(&self) -> Option<Format> {
        match self {
            Dissection::Decoded { format, .. } => Some(*format),
            Dissection::Malformed { format, .. } => *format,
            Dissection::NeedMore { .. } | Dissection::Unsupported { .. } => None,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Dissection::Decoded { record, .. } => Some(record),
            Dissection::Malformed { partial, .. } => partial.as_ref(),
            Dissection::NeedMore { .. } | Dissection::Unsupported { .. } => None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, Dissection::Decoded { .. })
    }
}

/// Stateless decoder for TAK, CoT XML and OMNI buffers.
#[derive(Debug, Clone, Default)]
pub struct Dissector {
    options: DissectOptions,
}

impl Dissector {
    pub fn new(options: DissectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DissectOptions {
        &self.options
    }

    /// Dissect the first message in `buf`.
    pub fn dissect(&self, buf: &[u8], transport: Transport) -> Dissection {
        let classification = classify(buf, transport);
        debug!(len = buf.len(), ?transport, ?classification, "classified buffer");

        match classification {
            Classification::Xml => {
                let consumed = match transport {
                    Transport::Stream => xml_frame_len(buf).unwrap_or(buf.len()),
                    Transport::Datagram => buf.len(),
                };
                self.dissect_xml(&buf[..consumed])
            }
            Classification::TakStream {
                header_len,
                frame_len,
            } => self.dissect_binary(Format::TakStream, buf, header_len, frame_len, |fields, diag| {
                Record::Tak(project_tak_message(fields, diag))
            }),
            Classification::TakMesh {
                version,
                header_len,
            } => self.dissect_binary(
                Format::TakMesh { version },
                buf,
                header_len,
                buf.len(),
                |fields, diag| Record::Tak(project_tak_message(fields, diag)),
            ),
            Classification::Omni => self.dissect_binary(Format::Omni, buf, 0, buf.len(), |fields, diag| {
                Record::Omni(project_base_event(fields, diag))
            }),
            Classification::NeedMore { additional } => Dissection::NeedMore { additional },
            Classification::Malformed { format, error } => Dissection::Malformed {
                format,
                reason: error.to_string(),
                offset: error.offset(),
                consumed: buf.len(),
                partial: None,
            },
            Classification::Unrecognized if buf.is_empty() => self.unsupported(buf, "empty buffer"),
            Classification::Unrecognized => self.unsupported(buf, "unrecognized leading bytes"),
        }
    }

    /// Dissect every message in a stream buffer, re-offering the bytes left
    /// after each one.
    ///
    /// Stops at the end of the buffer or at the first
    /// [`Dissection::NeedMore`], which is included. Offsets in each outcome
    /// are relative to the start of that message.
    pub fn dissect_stream(&self, buf: &[u8]) -> Vec<Dissection> {
        let mut outcomes = Vec::new();
        let mut rest = buf;

        while !rest.is_empty() {
            let outcome = self.dissect(rest, Transport::Stream);
            let consumed = outcome.consumed();
            outcomes.push(outcome);
            match consumed {
                Some(n) if n > 0 => rest = &rest[n.min(rest.len())..],
                _ => break,
            }
        }
        outcomes
    }

    fn dissect_xml(&self, data: &[u8]) -> Dissection {
        let mut diag = Diagnostics::new();
        let event = decode_cot_xml(data, &mut diag);
        finish(Format::Xml, Record::Cot(event), data.len(), diag, None)
    }

    fn dissect_binary<F>(&self, format: Format, buf: &[u8], start: usize, end: usize, project: F) -> Dissection
    where
        F: FnOnce(&FieldMap<'_>, &mut Diagnostics) -> Record,
    {
        let walk = parse_message(buf, start, end - start);
        let mut diag = Diagnostics::new();
        let record = project(&walk.fields, &mut diag);

        if let Some(error) = &walk.error {
            match error.class() {
                ErrorClass::Malformed => {
                    debug!(%format, offset = error.offset(), %error, "payload walk stopped");
                    return Dissection::Malformed {
                        format: Some(format),
                        reason: error.to_string(),
                        offset: error.offset(),
                        consumed: end,
                        partial: Some(record),
                    };
                }
                ErrorClass::Unsupported => diag.wire("payload", error),
            }
        }

        let raw = self.options.raw_fields.then(|| raw_fields(&walk.fields));
        finish(format, record, end, diag, raw)
    }

    fn unsupported(&self, buf: &[u8], reason: &str) -> Dissection {
        let preview = buf[..buf.len().min(self.options.preview_bytes)].to_vec();
        Dissection::Unsupported {
            reason: reason.to_string(),
            preview,
            consumed: buf.len(),
        }
    }
}

/// A record with a malformed nested value is reported as malformed, keeping
/// the record as the partial result.
fn finish(
    format: Format,
    record: Record,
    consumed: usize,
    diag: Diagnostics,
    raw: Option<Vec<RawField>>,
) -> Dissection {
    if let Some(issue) = diag.first_malformed() {
        return Dissection::Malformed {
            format: Some(format),
            reason: format!("{}: {}", issue.context, issue.message),
            offset: issue.offset,
            consumed,
            partial: Some(record),
        };
    }
    Dissection::Decoded {
        format,
        record,
        consumed,
        warnings: diag.into_issues(),
        raw,
    }
}
