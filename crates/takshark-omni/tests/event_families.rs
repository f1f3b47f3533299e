use takshark_omni::{project_base_event, BaseEvent, EventPayload, EventType, Geopoint};
use takshark_wire::{parse_all, put_tag, put_varint, Diagnostics, WireType};

/// BaseEvent with entity_id 12345678, sequence number 1 and one event field.
fn base_event(field: u32, body: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x08];
    put_varint(&mut buf, 12_345_678);
    buf.extend_from_slice(&[0x48, 0x01]);
    put_tag(&mut buf, field, WireType::LengthDelimited);
    put_varint(&mut buf, body.len() as u64);
    buf.extend_from_slice(body);
    buf
}

fn with_len(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag, body.len() as u8];
    out.extend_from_slice(body);
    out
}

fn geopoint(lat: f64, lon: f64) -> Vec<u8> {
    let mut out = vec![0x09];
    out.extend_from_slice(&lat.to_le_bytes());
    out.push(0x11);
    out.extend_from_slice(&lon.to_le_bytes());
    out
}

fn project(buf: &[u8]) -> BaseEvent {
    let walk = parse_all(buf);
    assert!(walk.error.is_none());
    let mut diag = Diagnostics::new();
    let event = project_base_event(&walk.fields, &mut diag);
    assert!(diag.is_empty(), "{:?}", diag.issues());
    assert_eq!(event.entity_id, Some(12_345_678));
    event
}

#[test]
fn test_every_family_projects() {
    let cases: Vec<(u32, Vec<u8>, EventPayload)> = vec![
        (
            12,
            with_len(0x12, &geopoint(37.0, -110.0)),
            EventPayload::Track {
                location: Some(Geopoint {
                    lat: Some(37.0),
                    lon: Some(-110.0),
                }),
            },
        ),
        (
            13,
            with_len(0x1A, &with_len(0x0A, b"ALPHA-1")),
            EventPayload::Player {
                callsign: Some("ALPHA-1".to_string()),
            },
        ),
        (14, vec![0x18, 0x01], EventPayload::Sensor { status: Some(1) }),
        (
            15,
            vec![0x0A, 0x00, 0x40, 0x03],
            EventPayload::Shape {
                single_point: true,
                environment: Some(3),
            },
        ),
        (
            16,
            with_len(0x0A, b"Test chat message"),
            EventPayload::Chat {
                sender: Some("Test chat message".to_string()),
                message: None,
            },
        ),
        (
            17,
            vec![0x08, 0x05],
            EventPayload::MissionAssignment {
                mission_type: Some(5),
            },
        ),
        (20, vec![0x08, 0x01], EventPayload::Weather { category: Some(1) }),
        (
            22,
            with_len(0x0A, b"KDEN"),
            EventPayload::AirfieldStatus {
                icao: Some("KDEN".to_string()),
            },
        ),
        (
            23,
            vec![0x08, 0x04],
            EventPayload::PersonnelRecovery {
                recovery_type: Some(4),
            },
        ),
        (25, vec![0x0A, 0x00], EventPayload::EntityManagement { drop: true }),
        (26, vec![0x0A, 0x00], EventPayload::NetworkManagement { ping: true }),
        (
            29,
            {
                let mut value = vec![0x09];
                value.extend_from_slice(&90.0f64.to_le_bytes());
                with_len(0x0A, &value)
            },
            EventPayload::NavigationVector { course: Some(90.0) },
        ),
        (
            36,
            with_len(0x12, &geopoint(37.5, -110.5)),
            EventPayload::Image {
                location: Some(Geopoint {
                    lat: Some(37.5),
                    lon: Some(-110.5),
                }),
            },
        ),
        (
            37,
            {
                let mut alert = with_len(0x0A, b"Test alert");
                alert.extend_from_slice(&[0x10, 0x02, 0x30, 0x09]);
                alert
            },
            EventPayload::Alert {
                message: Some("Test alert".to_string()),
                category: Some(2),
                alert_type: Some(9),
            },
        ),
        (
            42,
            with_len(0x22, &[0x08, 0x05]),
            EventPayload::FlightPath {
                total_points: Some(5),
            },
        ),
        (11, Vec::new(), EventPayload::Other),
    ];

    for (field, body, expected) in cases {
        let event = project(&base_event(field, &body));
        assert_eq!(event.event_field, Some(field));
        assert_eq!(
            event.event_type,
            Some(EventType::from_field_number(field)),
            "field {field}"
        );
        assert_ne!(event.event_type, Some(EventType::Unknown));
        assert_eq!(event.event.as_ref(), Some(&expected), "field {field}");
    }
}

#[test]
fn test_json_shape() {
    let event = project(&base_event(20, &[0x08, 0x01]));
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["entity_id"], 12_345_678);
    assert_eq!(json["event_type"], "Weather");
    assert_eq!(json["event"]["kind"], "Weather");
    assert_eq!(json["event"]["category"], 1);
    assert!(json.get("origin").is_none());
}
