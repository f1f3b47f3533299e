//! OMNI `BaseEvent` projection.
//!
//! Fields 1 through 10 are the BaseEvent header. Every higher field number is
//! a candidate for the event oneof: the first one on the wire is selected and
//! the rest are reported and ignored.

use crate::event::{
    Alias, BaseEvent, EventOrigin, EventPayload, EventType, Geopoint, TimeOfValidity,
};
use takshark_wire::{Diagnostics, FieldMap};
use tracing::debug;

/// Field numbers of `BaseEvent`.
pub mod base_event {
    pub const ENTITY_ID: u32 = 1;
    pub const EVENT_ORIGIN: u32 = 2;
    pub const TIME_OF_VALIDITY: u32 = 4;
    pub const ALIAS: u32 = 5;
    pub const EVENT_SEQUENCE_NUMBER: u32 = 9;
    /// Highest header field; the oneof starts above it
    pub const LAST_HEADER_FIELD: u32 = 10;
}

/// Project a `BaseEvent`.
pub fn project_base_event(fields: &FieldMap<'_>, diag: &mut Diagnostics) -> BaseEvent {
    use base_event as f;

    let origin = diag
        .nested("BaseEvent.eventOrigin", fields.message(f::EVENT_ORIGIN))
        .map(|m| EventOrigin {
            source_uid: diag.field("EventOrigin.sourceUid", m.string(1)),
            source_net: diag.field("EventOrigin.sourceNet", m.string(2)),
        });
    let time_of_validity = diag
        .nested("BaseEvent.timeOfValidity", fields.message(f::TIME_OF_VALIDITY))
        .map(|m| TimeOfValidity {
            updated: diag.field("TimeOfValidity.updated", m.uint64(2)),
            timeout: diag.field("TimeOfValidity.timeout", m.uint64(3)),
        });
    let aliases = diag
        .field("BaseEvent.alias", fields.messages(f::ALIAS))
        .unwrap_or_default()
        .into_iter()
        .map(|walk| {
            let m = diag.walk("BaseEvent.alias", walk);
            Alias {
                domain: diag.field("Alias.domain", m.string(1)),
                field: diag.field("Alias.field", m.string(2)),
                network_name: diag.field("Alias.networkName", m.string(3)),
                id: diag.field("Alias.id", m.string(4)),
            }
        })
        .collect();

    let mut event = BaseEvent {
        entity_id: diag.field("BaseEvent.entityId", fields.uint64(f::ENTITY_ID)),
        origin,
        time_of_validity,
        aliases,
        event_sequence_number: diag.field(
            "BaseEvent.eventSequenceNumber",
            fields.uint64(f::EVENT_SEQUENCE_NUMBER),
        ),
        ..BaseEvent::default()
    };

    let mut candidates = fields
        .iter()
        .filter(|field| field.number() > f::LAST_HEADER_FIELD)
        .map(|field| (field.number(), field.first().map_or(0, |v| v.offset)));

    let Some((number, offset)) = candidates.next() else {
        return event;
    };

    for (extra, extra_offset) in candidates {
        diag.unsupported(
            "BaseEvent.event",
            extra_offset,
            format!("additional event field {extra} ignored, field {number} already selected"),
        );
    }

    let event_type = EventType::from_field_number(number);
    event.event_type = Some(event_type);
    event.event_field = Some(number);

    if event_type == EventType::Unknown {
        debug!(field = number, "unknown OMNI event field");
        diag.unsupported("BaseEvent.event", offset, format!("unknown event field {number}"));
        return event;
    }

    let context = format!("BaseEvent.{}", event_type.name());
    event.event = diag
        .nested(&context, fields.message(number))
        .map(|payload| project_payload(event_type, &payload, diag));
    event
}

/// Project the body of one event family.
///
/// `event_type` must not be [`EventType::Unknown`]; if it is, the payload is
/// treated as [`EventPayload::Other`].
pub fn project_payload(
    event_type: EventType,
    fields: &FieldMap<'_>,
    diag: &mut Diagnostics,
) -> EventPayload {
    match event_type {
        EventType::Other | EventType::Unknown => EventPayload::Other,
        EventType::Track => EventPayload::Track {
            location: geopoint("TrackEvent.geopoint", fields, 2, diag),
        },
        EventType::Player => EventPayload::Player {
            callsign: diag
                .nested("PlayerEvent.communicationParameters", fields.message(3))
                .and_then(|m| diag.field("CommunicationParameters.callsign", m.string(1))),
        },
        EventType::Sensor => EventPayload::Sensor {
            status: diag.field("SensorEvent.status", fields.int32(3)),
        },
        EventType::Shape => EventPayload::Shape {
            single_point: fields.contains(1),
            environment: diag.field("ShapeEvent.environment", fields.int32(8)),
        },
        EventType::Chat => EventPayload::Chat {
            sender: diag.field("ChatEvent.sender", fields.string(1)),
            message: diag.field("ChatEvent.message", fields.string(2)),
        },
        EventType::MissionAssignment => EventPayload::MissionAssignment {
            mission_type: diag.field("MissionAssignmentEvent.missionType", fields.int32(1)),
        },
        EventType::Weather => EventPayload::Weather {
            category: diag.field("WeatherEvent.category", fields.int32(1)),
        },
        EventType::AirfieldStatus => EventPayload::AirfieldStatus {
            icao: diag.field("AirfieldStatusEvent.icao", fields.string(1)),
        },
        EventType::PersonnelRecovery => EventPayload::PersonnelRecovery {
            recovery_type: diag.field("PersonnelRecoveryEvent.recoveryType", fields.int32(1)),
        },
        EventType::EntityManagement => EventPayload::EntityManagement {
            drop: fields.contains(1),
        },
        EventType::NetworkManagement => EventPayload::NetworkManagement {
            ping: fields.contains(1),
        },
        EventType::NavigationVector => EventPayload::NavigationVector {
            course: diag
                .nested("NavigationVectorEvent.course", fields.message(1))
                .and_then(|m| diag.field("DoubleValue.value", m.double(1))),
        },
        EventType::Image => EventPayload::Image {
            location: geopoint("ImageEvent.location", fields, 2, diag),
        },
        EventType::Alert => EventPayload::Alert {
            message: diag.field("AlertEvent.message", fields.string(1)),
            category: diag.field("AlertEvent.category", fields.int32(2)),
            alert_type: diag.field("AlertEvent.alertType", fields.int32(6)),
        },
        EventType::FlightPath => EventPayload::FlightPath {
            total_points: diag
                .nested("FlightPathEvent.totalPoints", fields.message(4))
                .and_then(|m| diag.field("Int32Value.value", m.int32(1))),
        },
    }
}

fn geopoint(
    context: &str,
    fields: &FieldMap<'_>,
    number: u32,
    diag: &mut Diagnostics,
) -> Option<Geopoint> {
    diag.nested(context, fields.message(number)).map(|m| Geopoint {
        lat: diag.field("Geopoint.lat", m.double(1)),
        lon: diag.field("Geopoint.lon", m.double(2)),
    })
}
