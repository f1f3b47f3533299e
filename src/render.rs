//! Text and JSON rendering of dissection outcomes.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;
use takshark_cot::{CotEvent, TakMessage};
use takshark_dissect::{Dissection, RawEntry, RawField, Record};
use takshark_omni::BaseEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One summary line per outcome
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    source: &'a str,
    #[serde(flatten)]
    dissection: &'a Dissection,
}

/// Render one outcome. `source` names where the bytes came from.
pub fn render(source: &str, dissection: &Dissection, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(&JsonLine { source, dissection })
            .unwrap_or_else(|e| format!(r#"{{"source":{source:?},"error":"{e}"}}"#)),
        OutputFormat::Text => render_text(source, dissection),
    }
}

fn render_text(source: &str, dissection: &Dissection) -> String {
    let mut out = String::new();
    match dissection {
        Dissection::Decoded {
            format,
            record,
            consumed,
            warnings,
            raw,
        } => {
            let _ = write!(out, "{source}: {format} {consumed}B {}", summarize(record));
            if !warnings.is_empty() {
                let _ = write!(out, " ({} warnings)", warnings.len());
            }
            for warning in warnings {
                let _ = write!(
                    out,
                    "\n  warning @{}: {}: {}",
                    warning.offset, warning.context, warning.message
                );
            }
            if let Some(raw) = raw {
                write_raw(&mut out, raw, 1);
            }
        }
        Dissection::NeedMore { additional } => {
            let _ = write!(out, "{source}: incomplete frame, {additional} more bytes needed");
        }
        Dissection::Malformed {
            format,
            reason,
            offset,
            partial,
            ..
        } => {
            let label = format.map_or_else(|| "TAK".to_string(), |f| f.to_string());
            let _ = write!(out, "{source}: malformed {label} at offset {offset}: {reason}");
            if let Some(record) = partial {
                let _ = write!(out, "\n  partial: {}", summarize(record));
            }
        }
        Dissection::Unsupported {
            reason, preview, ..
        } => {
            let _ = write!(out, "{source}: unsupported ({reason}) {}", hex::encode(preview));
        }
    }
    out
}

/// One-line summary of a record.
pub fn summarize(record: &Record) -> String {
    match record {
        Record::Cot(event) => summarize_cot(event),
        Record::Tak(message) => summarize_tak(message),
        Record::Omni(event) => summarize_omni(event),
    }
}

fn summarize_tak(message: &TakMessage) -> String {
    let mut parts = Vec::new();
    if let Some(control) = &message.tak_control {
        parts.push(format!(
            "TakControl v{}-{}",
            control.min_proto_version.unwrap_or(0),
            control.max_proto_version.unwrap_or(0)
        ));
    }
    if let Some(event) = &message.cot_event {
        parts.push(summarize_cot(event));
    }
    if parts.is_empty() {
        return "TakMessage (empty)".to_string();
    }
    parts.join(" ")
}

fn summarize_cot(event: &CotEvent) -> String {
    let mut out = String::from("CotEvent");
    let mut field = |name: &str, value: Option<&str>| {
        if let Some(value) = value {
            let _ = write!(out, " {name}={value}");
        }
    };
    field("type", event.event_type.as_deref());
    field("uid", event.uid.as_deref());
    field("how", event.how.as_deref());
    field("callsign", event.callsign());
    field("group", event.group_name());

    if let Some(affiliation) = event.affiliation() {
        let _ = write!(out, " affiliation={affiliation}");
    }
    if let Some(point) = &event.point {
        if let (Some(lat), Some(lon)) = (point.lat, point.lon) {
            let _ = write!(out, " lat={lat} lon={lon}");
        }
    }
    if let Some(time) = &event.time {
        let _ = write!(out, " time={time}");
    }
    out
}

fn summarize_omni(event: &BaseEvent) -> String {
    let mut out = String::from("BaseEvent");
    if let Some(id) = event.entity_id {
        let _ = write!(out, " entity={id}");
    }
    if let Some(seq) = event.event_sequence_number {
        let _ = write!(out, " seq={seq}");
    }
    if let Some(uid) = event.origin.as_ref().and_then(|o| o.source_uid.as_deref()) {
        let _ = write!(out, " origin={uid}");
    }
    match (event.event_type, event.event_field) {
        (Some(event_type), Some(field)) => {
            let _ = write!(out, " event={event_type}({field})");
        }
        (Some(event_type), None) => {
            let _ = write!(out, " event={event_type}");
        }
        _ => {}
    }
    out
}

fn write_raw(out: &mut String, fields: &[RawField], depth: usize) {
    let indent = "  ".repeat(depth);
    for field in fields {
        for entry in &field.values {
            let _ = write!(out, "\n{indent}#{} @{} ", field.number, entry.offset());
            match entry {
                RawEntry::Varint { value, .. } => {
                    let _ = write!(out, "varint {value}");
                }
                RawEntry::Fixed64 { hex, .. } => {
                    let _ = write!(out, "fixed64 {hex}");
                }
                RawEntry::Fixed32 { hex, .. } => {
                    let _ = write!(out, "fixed32 {hex}");
                }
                RawEntry::Text { value, .. } => {
                    let _ = write!(out, "{value:?}");
                }
                RawEntry::Bytes { hex, .. } => {
                    let _ = write!(out, "bytes {hex}");
                }
                RawEntry::Message { fields, .. } => {
                    out.push_str("message");
                    write_raw(out, fields, depth + 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use takshark_dissect::{DissectOptions, Dissector, Transport};

    const FRAME: [u8; 30] = [
        0xBF, 0x1C, 0x12, 0x1A, 0x0A, 0x05, b'a', b'-', b'f', b'-', b'G', 0x2A, 0x0C, b't', b'e',
        b's', b't', b'-', b'u', b'i', b'd', b'-', b'1', b'2', b'3', 0x4A, 0x03, b'm', b'-', b'g',
    ];

    #[test]
    fn test_text_decoded() {
        let outcome = Dissector::default().dissect(&FRAME, Transport::Stream);
        let line = render("hex#1", &outcome, OutputFormat::Text);
        assert_eq!(
            line,
            "hex#1: TAK-Stream 30B CotEvent type=a-f-G uid=test-uid-123 how=m-g affiliation=Friend"
        );
    }

    #[test]
    fn test_text_other_outcomes() {
        let dissector = Dissector::default();
        let line = render("s", &dissector.dissect(&FRAME[..10], Transport::Stream), OutputFormat::Text);
        assert_eq!(line, "s: incomplete frame, 20 more bytes needed");

        let line = render("d", &dissector.dissect(&[0x00, 0x01], Transport::Datagram), OutputFormat::Text);
        assert_eq!(line, "d: unsupported (unrecognized leading bytes) 0001");

        let line = render("d", &dissector.dissect(&FRAME[..10], Transport::Datagram), OutputFormat::Text);
        assert!(line.starts_with("d: malformed TAK-Stream at offset 1: "), "{line}");
    }

    #[test]
    fn test_json_line() {
        let outcome = Dissector::default().dissect(&FRAME, Transport::Stream);
        let line = render("hex#1", &outcome, OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["source"], "hex#1");
        assert_eq!(json["outcome"], "decoded");
        assert_eq!(json["consumed"], 30);
        assert_eq!(json["record"]["body"]["cot_event"]["how"], "m-g");
    }

    #[test]
    fn test_raw_fields_rendered() {
        let dissector = Dissector::new(DissectOptions {
            raw_fields: true,
            ..DissectOptions::default()
        });
        let outcome = dissector.dissect(&FRAME, Transport::Stream);
        let text = render("r", &outcome, OutputFormat::Text);
        assert!(text.contains("\n  #2 @2 message"), "{text}");
        assert!(text.contains("\n    #1 @4 \"a-f-G\""), "{text}");
        assert!(text.contains("\n    #9 @25 \"m-g\""), "{text}");
    }

    #[test]
    fn test_omni_summary() {
        let outcome = Dissector::default().dissect(&[0x08, 0xB9, 0x60, 0x62, 0x00], Transport::Datagram);
        let line = render("u", &outcome, OutputFormat::Text);
        assert_eq!(line, "u: OMNI 5B BaseEvent entity=12345 event=Track(12)");
    }
}
