//! OMNI BaseEvent records and the oneof dispatch table

use serde::{Deserialize, Serialize};
use std::fmt;

/// OMNI BaseEvent with its header fields and the selected event payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<EventOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_validity: Option<TimeOfValidity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Alias>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_sequence_number: Option<u64>,
    /// Event family named by the oneof field, `None` if no event field was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    /// Field number the event arrived on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_field: Option<u32>,
    /// Projected payload; `None` for unknown event fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventPayload>,
}

/// Where an event came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOrigin {
    pub source_uid: Option<String>,
    pub source_net: Option<String>,
}

/// Validity window, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfValidity {
    pub updated: Option<u64>,
    pub timeout: Option<u64>,
}

/// Identifier of the same entity in another system (e.g. domain "CoT", field "uid")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub domain: Option<String>,
    pub field: Option<String>,
    pub network_name: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geopoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Display-relevant content of each event family.
///
/// Enumerated values are kept as their wire numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventPayload {
    Other,
    Track {
        location: Option<Geopoint>,
    },
    Player {
        callsign: Option<String>,
    },
    Sensor {
        status: Option<i32>,
    },
    Shape {
        /// SinglePoint geometry present
        single_point: bool,
        environment: Option<i32>,
    },
    Chat {
        sender: Option<String>,
        message: Option<String>,
    },
    MissionAssignment {
        mission_type: Option<i32>,
    },
    Weather {
        category: Option<i32>,
    },
    AirfieldStatus {
        /// ICAO airfield code (e.g. "KDEN")
        icao: Option<String>,
    },
    PersonnelRecovery {
        recovery_type: Option<i32>,
    },
    EntityManagement {
        /// Drop command present
        drop: bool,
    },
    NetworkManagement {
        /// Ping command present
        ping: bool,
    },
    NavigationVector {
        /// Course in degrees
        course: Option<f64>,
    },
    Image {
        location: Option<Geopoint>,
    },
    Alert {
        message: Option<String>,
        category: Option<i32>,
        alert_type: Option<i32>,
    },
    FlightPath {
        total_points: Option<i32>,
    },
}

/// Event family selected by the BaseEvent oneof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Other,
    Track,
    Player,
    Sensor,
    Shape,
    Chat,
    MissionAssignment,
    Weather,
    AirfieldStatus,
    PersonnelRecovery,
    EntityManagement,
    NetworkManagement,
    NavigationVector,
    Image,
    Alert,
    FlightPath,
    /// A field number outside the dispatch table
    Unknown,
}

/// Oneof field number to event family.
pub const EVENT_TYPES: [(u32, EventType); 16] = [
    (11, EventType::Other),
    (12, EventType::Track),
    (13, EventType::Player),
    (14, EventType::Sensor),
    (15, EventType::Shape),
    (16, EventType::Chat),
    (17, EventType::MissionAssignment),
    (20, EventType::Weather),
    (22, EventType::AirfieldStatus),
    (23, EventType::PersonnelRecovery),
    (25, EventType::EntityManagement),
    (26, EventType::NetworkManagement),
    (29, EventType::NavigationVector),
    (36, EventType::Image),
    (37, EventType::Alert),
    (42, EventType::FlightPath),
];

impl EventType {
    /// Look up the family for a oneof field number; anything not in the
    /// table is [`EventType::Unknown`].
    pub fn from_field_number(number: u32) -> Self {
        EVENT_TYPES
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, t)| *t)
            .unwrap_or(EventType::Unknown)
    }

    pub fn field_number(self) -> Option<u32> {
        EVENT_TYPES
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(n, _)| *n)
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::Other => "Other",
            EventType::Track => "Track",
            EventType::Player => "Player",
            EventType::Sensor => "Sensor",
            EventType::Shape => "Shape",
            EventType::Chat => "Chat",
            EventType::MissionAssignment => "MissionAssignment",
            EventType::Weather => "Weather",
            EventType::AirfieldStatus => "AirfieldStatus",
            EventType::PersonnelRecovery => "PersonnelRecovery",
            EventType::EntityManagement => "EntityManagement",
            EventType::NetworkManagement => "NetworkManagement",
            EventType::NavigationVector => "NavigationVector",
            EventType::Image => "Image",
            EventType::Alert => "Alert",
            EventType::FlightPath => "FlightPath",
            EventType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(EventType::from_field_number(12), EventType::Track);
        assert_eq!(EventType::from_field_number(37), EventType::Alert);
        assert_eq!(EventType::from_field_number(11), EventType::Other);
        assert_eq!(EventType::from_field_number(42), EventType::FlightPath);
        assert_eq!(EventType::from_field_number(99), EventType::Unknown);
        assert_eq!(EventType::from_field_number(0), EventType::Unknown);
        assert_eq!(EventType::from_field_number(18), EventType::Unknown);
    }

    #[test]
    fn test_table_round_trip() {
        for (number, event_type) in EVENT_TYPES {
            assert_eq!(EventType::from_field_number(number), event_type);
            assert_eq!(event_type.field_number(), Some(number));
        }
        assert_eq!(EventType::Unknown.field_number(), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(EventType::Track.to_string(), "Track");
        assert_eq!(EventType::MissionAssignment.name(), "MissionAssignment");
        assert_eq!(EventType::Unknown.to_string(), "Unknown");
    }
}
