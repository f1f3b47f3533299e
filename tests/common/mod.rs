//! Capture builders shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use takshark_wire::{put_tag, put_varint, WireType};

pub const POSITION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<event version="2.0" uid="ANDROID-1" type="a-h-G" how="m-g" time="2025-01-01T00:00:00Z" start="2025-01-01T00:00:00Z" stale="2025-01-01T00:05:00Z">
    <point lat="37.7749" lon="-122.4194" hae="100.0" ce="10.0" le="5.0"/>
    <detail>
        <contact callsign="SMOKE-TEST"/>
        <__group name="Cyan" role="Team Member"/>
    </detail>
</event>"#;

pub fn string_field(out: &mut Vec<u8>, field: u32, value: &str) {
    message_field(out, field, value.as_bytes());
}

pub fn message_field(out: &mut Vec<u8>, field: u32, body: &[u8]) {
    put_tag(out, field, WireType::LengthDelimited);
    put_varint(out, body.len() as u64);
    out.extend_from_slice(body);
}

pub fn varint_field(out: &mut Vec<u8>, field: u32, value: u64) {
    put_tag(out, field, WireType::Varint);
    put_varint(out, value);
}

/// TakMessage carrying a CotEvent with `uid`.
pub fn tak_payload(uid: &str) -> Vec<u8> {
    let mut event = Vec::new();
    string_field(&mut event, 1, "a-f-G-U-C");
    string_field(&mut event, 5, uid);
    varint_field(&mut event, 6, 1_735_689_600_000);
    string_field(&mut event, 9, "m-g");

    let mut payload = Vec::new();
    message_field(&mut payload, 2, &event);
    payload
}

/// Stream frame: `0xBF`, varint length, payload.
pub fn tak_stream_frame(uid: &str) -> Vec<u8> {
    let payload = tak_payload(uid);
    let mut frame = vec![0xBF];
    put_varint(&mut frame, payload.len() as u64);
    frame.extend_from_slice(&payload);
    frame
}

/// Mesh datagram: `0xBF`, version, `0xBF`, payload.
pub fn tak_mesh_datagram(version: u8, uid: &str) -> Vec<u8> {
    let mut datagram = vec![0xBF, version, 0xBF];
    datagram.extend_from_slice(&tak_payload(uid));
    datagram
}

/// OMNI BaseEvent with an entity id and an Alert payload.
pub fn omni_alert(entity_id: u64, message: &str) -> Vec<u8> {
    let mut alert = Vec::new();
    string_field(&mut alert, 1, message);

    let mut buf = Vec::new();
    varint_field(&mut buf, 1, entity_id);
    message_field(&mut buf, 37, &alert);
    buf
}

/// Write `bytes` to a per-test file under the system temp directory.
pub fn write_capture(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("takshark-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).expect("write capture");
    path
}
