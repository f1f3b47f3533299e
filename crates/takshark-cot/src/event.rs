//! CoT event records and affiliation parsing
//!
//! The same record shape is produced from CoT XML and from TAK protobuf
//! payloads. Every field is optional: a field that was not on the wire (or
//! failed its type check) is `None`, never a default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CoT event decoded from XML or a TAK `CotEvent`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CotEvent {
    /// CoT version (XML only, typically "2.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// CoT type (e.g., "a-f-G" for atom-friendly-ground)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opex: Option<String>,
    /// Unique identifier for this event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Event (send) timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<CotTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<CotTime>,
    /// When the event becomes invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<CotTime>,
    /// How the event was generated (e.g., "h-e" for human-entered)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Detail>,
}

/// Timestamp as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CotTime {
    /// Milliseconds since the Unix epoch (TAK protobuf)
    Millis(u64),
    /// Attribute text, normally RFC 3339 (CoT XML)
    Text(String),
}

impl CotTime {
    /// Interpret the timestamp, if it is a valid instant.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CotTime::Millis(ms) => millis_to_datetime(*ms),
            CotTime::Text(text) => text.parse::<DateTime<Utc>>().ok(),
        }
    }
}

impl fmt::Display for CotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.to_datetime()) {
            (_, Some(dt)) => write!(f, "{}", dt.to_rfc3339()),
            (CotTime::Millis(ms), None) => write!(f, "{ms} ms"),
            (CotTime::Text(text), None) => write!(f, "{text}"),
        }
    }
}

/// Convert milliseconds since epoch to DateTime<Utc>
fn millis_to_datetime(millis: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(millis / 1000).ok()?;
    let nanos = ((millis % 1000) * 1_000_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Geographic point with accuracy metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    pub lon: Option<f64>,
    /// Height above ellipsoid in meters
    pub hae: Option<f64>,
    /// Circular error in meters
    pub ce: Option<f64>,
    /// Linear error in meters
    pub le: Option<f64>,
}

impl Point {
    pub fn is_empty(&self) -> bool {
        self.lat.is_none()
            && self.lon.is_none()
            && self.hae.is_none()
            && self.ce.is_none()
            && self.le.is_none()
    }
}

/// Detail section with the display-relevant sub-elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Detail {
    /// Detail content not covered by the structured fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_location: Option<PrecisionLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// TAK version information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takv: Option<Takv>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<Track>,
    /// Free text remarks (XML only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Detail {
    /// Check if the detail is empty
    pub fn is_empty(&self) -> bool {
        self.xml_detail.is_none()
            && self.contact.is_none()
            && self.group.is_none()
            && self.precision_location.is_none()
            && self.status.is_none()
            && self.takv.is_none()
            && self.track.is_none()
            && self.remarks.is_none()
    }
}

/// Contact information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Endpoint for communication (e.g. "*:-1:stcp")
    pub endpoint: Option<String>,
    /// Callsign for display
    pub callsign: Option<String>,
}

/// Group (team) membership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Team color name (e.g. "Cyan")
    pub name: Option<String>,
    /// Role within the team (e.g. "Team Member")
    pub role: Option<String>,
}

/// Track information for moving entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Speed in meters per second
    pub speed: Option<f64>,
    /// Course/heading in degrees
    pub course: Option<f64>,
}

/// Status information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Battery level (0-100)
    pub battery: Option<u32>,
    /// Readiness flag (XML only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<String>,
}

/// TAK version and device information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Takv {
    pub device: Option<String>,
    /// Platform (e.g., "ATAK-CIV", "WinTAK", "iTAK")
    pub platform: Option<String>,
    pub os: Option<String>,
    pub version: Option<String>,
}

/// Precision location source information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionLocation {
    /// Geopoint source (e.g., "GPS", "USER")
    pub geopointsrc: Option<String>,
    /// Altitude source (e.g., "GPS", "DTED0", "???")
    pub altsrc: Option<String>,
}

/// MIL-STD-2525 affiliation parsed from CoT type field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affiliation {
    Pending,
    Unknown,
    AssumedFriend,
    Friend,
    Neutral,
    Suspect,
    Hostile,
    Joker,
    Faker,
    None,
}

impl Affiliation {
    /// Parse affiliation from an atom type such as "a-f-G".
    ///
    /// Only atoms ("a-...") carry an affiliation.
    pub fn from_cot_type(cot_type: &str) -> Option<Self> {
        let mut parts = cot_type.split('-');
        if parts.next() != Some("a") {
            return None;
        }

        match parts.next()?.chars().next() {
            Some('p') => Some(Affiliation::Pending),
            Some('u') => Some(Affiliation::Unknown),
            Some('a') => Some(Affiliation::AssumedFriend),
            Some('f') => Some(Affiliation::Friend),
            Some('n') => Some(Affiliation::Neutral),
            Some('s') => Some(Affiliation::Suspect),
            Some('h') => Some(Affiliation::Hostile),
            Some('j') => Some(Affiliation::Joker),
            Some('k') => Some(Affiliation::Faker),
            Some('o') => Some(Affiliation::None),
            _ => None,
        }
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Affiliation::Pending => write!(f, "Pending"),
            Affiliation::Unknown => write!(f, "Unknown"),
            Affiliation::AssumedFriend => write!(f, "Assumed Friend"),
            Affiliation::Friend => write!(f, "Friend"),
            Affiliation::Neutral => write!(f, "Neutral"),
            Affiliation::Suspect => write!(f, "Suspect"),
            Affiliation::Hostile => write!(f, "Hostile"),
            Affiliation::Joker => write!(f, "Joker"),
            Affiliation::Faker => write!(f, "Faker"),
            Affiliation::None => write!(f, "None"),
        }
    }
}

impl CotEvent {
    /// Get the affiliation from the event type
    pub fn affiliation(&self) -> Option<Affiliation> {
        self.event_type.as_deref().and_then(Affiliation::from_cot_type)
    }

    /// Get the callsign from the contact detail, if present
    pub fn callsign(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.contact.as_ref())
            .and_then(|c| c.callsign.as_deref())
    }

    /// Get the group name from the group detail, if present
    pub fn group_name(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.group.as_ref())
            .and_then(|g| g.name.as_deref())
    }
}

/// TAK protobuf control block (protocol negotiation)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakControl {
    pub min_proto_version: Option<u32>,
    pub max_proto_version: Option<u32>,
    pub contact_uid: Option<String>,
}

/// Top-level TAK protobuf message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TakMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tak_control: Option<TakControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cot_event: Option<CotEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affiliation_parsing() {
        assert_eq!(
            Affiliation::from_cot_type("a-f-G"),
            Some(Affiliation::Friend)
        );
        assert_eq!(
            Affiliation::from_cot_type("a-h-G"),
            Some(Affiliation::Hostile)
        );
        assert_eq!(
            Affiliation::from_cot_type("a-u-G-U-C"),
            Some(Affiliation::Unknown)
        );
        assert_eq!(Affiliation::from_cot_type("b-m-p-s-m"), None);
        assert_eq!(Affiliation::from_cot_type("invalid"), None);
    }

    #[test]
    fn test_millis_time() {
        let time = CotTime::Millis(1_705_314_600_000);
        let dt = time.to_datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert_eq!(time.to_string(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_text_time() {
        let time = CotTime::Text("2020-02-08T18:10:44.000Z".to_string());
        assert!(time.to_datetime().is_some());

        let garbage = CotTime::Text("yesterday".to_string());
        assert!(garbage.to_datetime().is_none());
        assert_eq!(garbage.to_string(), "yesterday");
    }

    #[test]
    fn test_event_helpers() {
        let event = CotEvent {
            event_type: Some("a-f-G-U-C".to_string()),
            detail: Some(Detail {
                contact: Some(Contact {
                    endpoint: None,
                    callsign: Some("Alpha-1".to_string()),
                }),
                group: Some(Group {
                    name: Some("Cyan".to_string()),
                    role: None,
                }),
                ..Detail::default()
            }),
            ..CotEvent::default()
        };

        assert_eq!(event.affiliation(), Some(Affiliation::Friend));
        assert_eq!(event.callsign(), Some("Alpha-1"));
        assert_eq!(event.group_name(), Some("Cyan"));
    }

    #[test]
    fn test_point_empty() {
        assert!(Point::default().is_empty());
        let point = Point {
            le: Some(9999999.0),
            ..Point::default()
        };
        assert!(!point.is_empty());
    }
}
