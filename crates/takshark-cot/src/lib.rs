//! CoT (Cursor on Target) records from XML and TAK protobuf payloads
//!
//! Both encodings project onto the same [`CotEvent`] record:
//!
//! - [`xml`] is a scan-based extractor for a fixed attribute/element subset
//!   of CoT XML, and [`cot_xml`] builds events from it.
//! - [`tak`] projects a generic protobuf field map onto the `TakMessage`,
//!   `TakControl`, `CotEvent` and `Detail` schemas.
//!
//! Fields that are absent or fail their type check are `None`; the reason is
//! recorded in a [`Diagnostics`](takshark_wire::Diagnostics).
//!
//! # Example
//!
//! ```rust
//! use takshark_cot::cot_xml::project_cot_xml;
//! use takshark_wire::Diagnostics;
//!
//! let cot_xml = r#"<?xml version="1.0"?>
//! <event version="2.0" uid="test-1" type="a-f-G"
//!        time="2024-01-15T10:30:00Z" how="h-e">
//!     <point lat="37.7749" lon="-122.4194" hae="100.0" ce="10.0" le="5.0"/>
//! </event>"#;
//!
//! let mut diag = Diagnostics::new();
//! let event = project_cot_xml(cot_xml, &mut diag);
//! assert_eq!(event.uid.as_deref(), Some("test-1"));
//! assert_eq!(event.point.unwrap().lat, Some(37.7749));
//! ```

pub mod cot_xml;
pub mod event;
pub mod tak;
pub mod xml;

pub use cot_xml::{decode_cot_xml, project_cot_xml};
pub use event::{
    Affiliation, Contact, CotEvent, CotTime, Detail, Group, Point, PrecisionLocation, Status,
    TakControl, TakMessage, Takv, Track,
};
pub use tak::{project_cot_event, project_tak_message};
