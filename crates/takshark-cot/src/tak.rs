//! TAK protobuf (`TakMessage`) projection.
//!
//! Reads named fields out of a generic [`FieldMap`]. Field numbers follow
//! the TAK protocol version 1 messages.

use crate::event::{
    Contact, CotEvent, CotTime, Detail, Group, Point, PrecisionLocation, Status, TakControl,
    TakMessage, Takv, Track,
};
use takshark_wire::{Diagnostics, FieldMap};

/// Field numbers of `TakMessage`.
pub mod tak_message {
    pub const TAK_CONTROL: u32 = 1;
    pub const COT_EVENT: u32 = 2;
}

/// Field numbers of `TakControl`.
pub mod tak_control {
    pub const MIN_PROTO_VERSION: u32 = 1;
    pub const MAX_PROTO_VERSION: u32 = 2;
    pub const CONTACT_UID: u32 = 3;
}

/// Field numbers of `CotEvent`.
pub mod cot_event {
    pub const TYPE: u32 = 1;
    pub const ACCESS: u32 = 2;
    pub const QOS: u32 = 3;
    pub const OPEX: u32 = 4;
    pub const UID: u32 = 5;
    pub const SEND_TIME: u32 = 6;
    pub const START_TIME: u32 = 7;
    pub const STALE_TIME: u32 = 8;
    pub const HOW: u32 = 9;
    pub const LAT: u32 = 10;
    pub const LON: u32 = 11;
    pub const HAE: u32 = 12;
    pub const CE: u32 = 13;
    pub const LE: u32 = 14;
    pub const DETAIL: u32 = 15;
}

/// Field numbers of `Detail`.
pub mod detail {
    pub const XML_DETAIL: u32 = 1;
    pub const CONTACT: u32 = 2;
    pub const GROUP: u32 = 3;
    pub const PRECISION_LOCATION: u32 = 4;
    pub const STATUS: u32 = 5;
    pub const TAKV: u32 = 6;
    pub const TRACK: u32 = 7;
}

/// Project a `TakMessage`.
pub fn project_tak_message(fields: &FieldMap<'_>, diag: &mut Diagnostics) -> TakMessage {
    let tak_control = diag
        .nested("TakMessage.takControl", fields.message(tak_message::TAK_CONTROL))
        .map(|control| project_tak_control(&control, diag));
    let cot_event = diag
        .nested("TakMessage.cotEvent", fields.message(tak_message::COT_EVENT))
        .map(|event| project_cot_event(&event, diag));

    TakMessage {
        tak_control,
        cot_event,
    }
}

pub fn project_tak_control(fields: &FieldMap<'_>, diag: &mut Diagnostics) -> TakControl {
    TakControl {
        min_proto_version: diag.field(
            "TakControl.minProtoVersion",
            fields.uint32(tak_control::MIN_PROTO_VERSION),
        ),
        max_proto_version: diag.field(
            "TakControl.maxProtoVersion",
            fields.uint32(tak_control::MAX_PROTO_VERSION),
        ),
        contact_uid: diag.field("TakControl.contactUid", fields.string(tak_control::CONTACT_UID)),
    }
}

/// Project a `CotEvent`.
pub fn project_cot_event(fields: &FieldMap<'_>, diag: &mut Diagnostics) -> CotEvent {
    use cot_event as f;

    let point = Point {
        lat: diag.field("CotEvent.lat", fields.double(f::LAT)),
        lon: diag.field("CotEvent.lon", fields.double(f::LON)),
        hae: diag.field("CotEvent.hae", fields.double(f::HAE)),
        ce: diag.field("CotEvent.ce", fields.double(f::CE)),
        le: diag.field("CotEvent.le", fields.double(f::LE)),
    };

    let detail = diag
        .nested("CotEvent.detail", fields.message(f::DETAIL))
        .map(|detail| project_detail(&detail, diag));

    CotEvent {
        version: None,
        event_type: diag.field("CotEvent.type", fields.string(f::TYPE)),
        access: diag.field("CotEvent.access", fields.string(f::ACCESS)),
        qos: diag.field("CotEvent.qos", fields.string(f::QOS)),
        opex: diag.field("CotEvent.opex", fields.string(f::OPEX)),
        uid: diag.field("CotEvent.uid", fields.string(f::UID)),
        time: diag
            .field("CotEvent.sendTime", fields.uint64(f::SEND_TIME))
            .map(CotTime::Millis),
        start: diag
            .field("CotEvent.startTime", fields.uint64(f::START_TIME))
            .map(CotTime::Millis),
        stale: diag
            .field("CotEvent.staleTime", fields.uint64(f::STALE_TIME))
            .map(CotTime::Millis),
        how: diag.field("CotEvent.how", fields.string(f::HOW)),
        point: (!point.is_empty()).then_some(point),
        detail,
    }
}

/// Project a `Detail`.
pub fn project_detail(fields: &FieldMap<'_>, diag: &mut Diagnostics) -> Detail {
    use detail as f;

    let contact = diag.nested("Detail.contact", fields.message(f::CONTACT)).map(|m| Contact {
        endpoint: diag.field("Contact.endpoint", m.string(1)),
        callsign: diag.field("Contact.callsign", m.string(2)),
    });
    let group = diag.nested("Detail.group", fields.message(f::GROUP)).map(|m| Group {
        name: diag.field("Group.name", m.string(1)),
        role: diag.field("Group.role", m.string(2)),
    });
    let precision_location = diag
        .nested("Detail.precisionLocation", fields.message(f::PRECISION_LOCATION))
        .map(|m| PrecisionLocation {
            geopointsrc: diag.field("PrecisionLocation.geopointsrc", m.string(1)),
            altsrc: diag.field("PrecisionLocation.altsrc", m.string(2)),
        });
    let status = diag.nested("Detail.status", fields.message(f::STATUS)).map(|m| Status {
        battery: diag.field("Status.battery", m.uint32(1)),
        readiness: None,
    });
    let takv = diag.nested("Detail.takv", fields.message(f::TAKV)).map(|m| Takv {
        device: diag.field("Takv.device", m.string(1)),
        platform: diag.field("Takv.platform", m.string(2)),
        os: diag.field("Takv.os", m.string(3)),
        version: diag.field("Takv.version", m.string(4)),
    });
    let track = diag.nested("Detail.track", fields.message(f::TRACK)).map(|m| Track {
        speed: diag.field("Track.speed", m.double(1)),
        course: diag.field("Track.course", m.double(2)),
    });

    Detail {
        xml_detail: diag.field("Detail.xmlDetail", fields.string(f::XML_DETAIL)),
        contact,
        group,
        precision_location,
        status,
        takv,
        track,
        remarks: None,
    }
}
