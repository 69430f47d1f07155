//! VEVENT generation.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::{CalIndexError, CalIndexResult};
use crate::event::Event;
use crate::ics::document::EventComponent;

/// Encode an event as a `VEVENT` block using `line_ending` between lines.
pub fn encode_event(event: &Event, line_ending: &str) -> CalIndexResult<EventComponent> {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.summary);

    let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    if event.all_day {
        let start = event.start.date_naive();
        let end = event.end.date_naive();
        add_date_property(&mut ics_event, "DTSTART", start);
        if end != start {
            add_date_property(&mut ics_event, "DTEND", end);
        }
    } else {
        add_utc_property(&mut ics_event, "DTSTART", event.start);
        add_utc_property(&mut ics_event, "DTEND", event.end);
    }

    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }
    if !event.location.is_empty() {
        ics_event.location(&event.location);
    }

    let mut cal = Calendar::new();
    cal.push(ics_event.done());
    let cal = cal.done();

    let raw = extract_vevent(&cal.to_string(), line_ending).ok_or_else(|| {
        CalIndexError::IcsGenerate(format!("no VEVENT generated for '{}'", event.uid))
    })?;
    Ok(EventComponent::from_raw(raw))
}

/// Cut the `VEVENT` block out of a generated calendar, re-terminating lines.
fn extract_vevent(ics: &str, line_ending: &str) -> Option<String> {
    let mut result = String::new();
    let mut in_event = false;

    for line in ics.lines() {
        if line == "BEGIN:VEVENT" {
            in_event = true;
        }
        if in_event {
            result.push_str(line);
            result.push_str(line_ending);
        }
        if line == "END:VEVENT" {
            return Some(result);
        }
    }

    None
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

fn add_utc_property(ics_event: &mut icalendar::Event, name: &str, time: DateTime<FixedOffset>) {
    let utc = time.with_timezone(&Utc);
    ics_event.add_property(name, utc.format("%Y%m%dT%H%M%SZ").to_string());
}
