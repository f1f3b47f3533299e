//! CoT XML to [`CotEvent`] projection using the scan extractor.

use crate::event::{
    Contact, CotEvent, CotTime, Detail, Group, Point, PrecisionLocation, Status, Takv, Track,
};
use crate::xml::{get_attr, get_element, get_element_with_attrs};
use std::borrow::Cow;
use takshark_wire::Diagnostics;
use tracing::debug;

/// Decode a CoT XML buffer.
///
/// Invalid UTF-8 is replaced rather than rejected so the rest of the event
/// still shows. Issue offsets always refer to `data`.
pub fn decode_cot_xml(data: &[u8], diag: &mut Diagnostics) -> CotEvent {
    let source = LossyText::new(data);
    if let Some(offset) = source.first_invalid {
        diag.unsupported("event", offset, "invalid UTF-8 replaced");
    }
    let first = diag.issues().len();
    let event = project_cot_xml(&source.text, diag);
    diag.remap_offsets(first, |offset| source.data_offset(offset));
    event
}

/// `data` as text with each invalid UTF-8 sequence replaced by U+FFFD.
struct LossyText<'a> {
    text: Cow<'a, str>,
    first_invalid: Option<usize>,
    /// `(text offset, data offset)` just past each replacement
    replacements: Vec<(usize, usize)>,
}

impl<'a> LossyText<'a> {
    fn new(data: &'a [u8]) -> Self {
        if let Ok(text) = std::str::from_utf8(data) {
            return Self {
                text: Cow::Borrowed(text),
                first_invalid: None,
                replacements: Vec::new(),
            };
        }

        let mut text = String::with_capacity(data.len() + 8);
        let mut replacements = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            match std::str::from_utf8(&data[pos..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_end = pos + e.valid_up_to();
                    text.push_str(std::str::from_utf8(&data[pos..valid_end]).unwrap_or_default());
                    text.push(char::REPLACEMENT_CHARACTER);
                    pos = e.error_len().map_or(data.len(), |len| valid_end + len);
                    replacements.push((text.len(), pos));
                }
            }
        }

        let first_invalid = replacements
            .first()
            .map(|&(text_end, _)| text_end - char::REPLACEMENT_CHARACTER.len_utf8());
        Self {
            text: Cow::Owned(text),
            first_invalid,
            replacements,
        }
    }

    /// Map an offset in `text` back to `data`.
    fn data_offset(&self, offset: usize) -> usize {
        let after = self.replacements.partition_point(|&(text_end, _)| text_end <= offset);
        match after.checked_sub(1).map(|i| self.replacements[i]) {
            Some((text_end, data_end)) => data_end + (offset - text_end),
            None => offset,
        }
    }
}

/// Build an event from already-decoded XML text.
///
/// A document without an `<event>` element is recorded as malformed.
pub fn project_cot_xml(text: &str, diag: &mut Diagnostics) -> CotEvent {
    let Some(event) = get_element_with_attrs(text, "event") else {
        debug!(len = text.len(), "XML payload has no <event> element");
        diag.malformed("event", 0, "no <event> element");
        return CotEvent::default();
    };

    let attr = |name: &str| get_attr(event, name).map(str::to_string);
    let time = |name: &str| get_attr(event, name).map(|t| CotTime::Text(t.to_string()));

    let point = get_element_with_attrs(text, "point").map(|element| {
        let mut number = |name: &str| parse_number(text, element, name, diag);
        Point {
            lat: number("lat"),
            lon: number("lon"),
            hae: number("hae"),
            ce: number("ce"),
            le: number("le"),
        }
    });

    let detail = get_element(text, "detail")
        .map(|inner| project_detail(text, inner, diag))
        .filter(|d| !d.is_empty());

    CotEvent {
        version: attr("version"),
        event_type: attr("type"),
        access: attr("access"),
        qos: attr("qos"),
        opex: attr("opex"),
        uid: attr("uid"),
        time: time("time"),
        start: time("start"),
        stale: time("stale"),
        how: attr("how"),
        point,
        detail,
    }
}

fn project_detail(text: &str, detail: &str, diag: &mut Diagnostics) -> Detail {
    let element = |tag: &str| get_element_with_attrs(detail, tag);
    let string = |element: &str, name: &str| get_attr(element, name).map(str::to_string);

    let contact = element("contact").map(|e| Contact {
        endpoint: string(e, "endpoint"),
        callsign: string(e, "callsign"),
    });
    let group = element("__group").map(|e| Group {
        name: string(e, "name"),
        role: string(e, "role"),
    });
    let precision_location = element("precisionlocation").map(|e| PrecisionLocation {
        geopointsrc: string(e, "geopointsrc"),
        altsrc: string(e, "altsrc"),
    });
    let status = element("status").map(|e| Status {
        battery: get_attr(e, "battery").and_then(|raw| match raw.trim().parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => {
                diag.unsupported("status.battery", offset_in(text, e), format!("invalid battery level {raw:?}"));
                None
            }
        }),
        readiness: string(e, "readiness"),
    });
    let takv = element("takv").map(|e| Takv {
        device: string(e, "device"),
        platform: string(e, "platform"),
        os: string(e, "os"),
        version: string(e, "version"),
    });
    let track = element("track").map(|e| Track {
        speed: parse_number(text, e, "speed", diag),
        course: parse_number(text, e, "course", diag),
    });
    let remarks = get_element(detail, "remarks").map(str::to_string);

    Detail {
        xml_detail: None,
        contact,
        group,
        precision_location,
        status,
        takv,
        track,
        remarks,
    }
}

/// Parse a numeric attribute; an unparsable value is recorded and dropped.
fn parse_number(text: &str, element: &str, name: &str, diag: &mut Diagnostics) -> Option<f64> {
    let raw = get_attr(element, name)?;
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            diag.unsupported(name, offset_in(text, element), format!("invalid number {raw:?}"));
            None
        }
    }
}

/// Byte offset of `part` inside `whole`. `part` must be a subslice.
fn offset_in(whole: &str, part: &str) -> usize {
    (part.as_ptr() as usize).saturating_sub(whole.as_ptr() as usize)
}
