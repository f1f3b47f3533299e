//! OMNI `BaseEvent` records
//!
//! [`project_base_event`] reads the BaseEvent header and resolves the event
//! oneof through [`EVENT_TYPES`]. Each known event family has a small
//! [`EventPayload`] with the fields worth showing; unknown families keep their
//! field number and are reported through [`Diagnostics`](takshark_wire::Diagnostics).
//!
//! # Example
//!
//! ```rust
//! use takshark_omni::{project_base_event, EventType};
//! use takshark_wire::{parse_all, Diagnostics};
//!
//! // entity_id 12345, then an empty Other event on field 11
//! let buf = [0x08, 0xB9, 0x60, 0x5A, 0x00];
//! let walk = parse_all(&buf);
//!
//! let mut diag = Diagnostics::new();
//! let event = project_base_event(&walk.fields, &mut diag);
//! assert_eq!(event.entity_id, Some(12345));
//! assert_eq!(event.event_type, Some(EventType::Other));
//! ```

pub mod event;
pub mod project;

pub use event::{
    Alias, BaseEvent, EventOrigin, EventPayload, EventType, Geopoint, TimeOfValidity, EVENT_TYPES,
};
pub use project::{project_base_event, project_payload};
