//! iCalendar codec.
//!
//! Files are decoded into a raw-preserving [`Document`]; only `VEVENT`
//! components are interpreted, everything else round-trips verbatim.

mod document;
mod generate;
mod parse;

pub use document::{Component, Document, EventComponent, OpaqueComponent};
pub use generate::encode_event;
pub use parse::{decode_event, parse_event};

use crate::event::Event;

/// Decode every usable event of a document, tagging it with `calendar_name`.
pub fn decode_events(document: &Document, calendar_name: &str) -> Vec<Event> {
    document
        .events()
        .filter_map(|component| decode_event(component, calendar_name))
        .collect()
}
