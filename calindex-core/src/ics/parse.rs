//! VEVENT decoding using the icalendar crate's parser.

use chrono::{DateTime, FixedOffset, Local};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Property, read_calendar, unfold},
};
use tracing::{debug, warn};

use crate::error::{CalIndexError, CalIndexResult};
use crate::event::{Event, UNTITLED_EVENT, default_end};
use crate::ics::document::{EventComponent, unescape_text};
use crate::time::{assume_local, local_midnight};

/// Decode an event component, logging and skipping it when unusable.
pub fn decode_event(component: &EventComponent, calendar_name: &str) -> Option<Event> {
    match parse_event(component.raw(), calendar_name) {
        Ok(Some(event)) => Some(event),
        Ok(None) => {
            debug!(uid = %component.uid(), "Skipping event without DTSTART");
            None
        }
        Err(err) => {
            warn!(uid = %component.uid(), error = %err, "Skipping unparseable event");
            None
        }
    }
}

/// Parse a single `VEVENT` block. `Ok(None)` means the event has no start.
pub fn parse_event(raw: &str, calendar_name: &str) -> CalIndexResult<Option<Event>> {
    let wrapped = format!("BEGIN:VCALENDAR\r\n{}\r\nEND:VCALENDAR", raw.trim_end());
    let unfolded = unfold(&wrapped);
    let calendar =
        read_calendar(&unfolded).map_err(|e| CalIndexError::IcsParse(e.to_string()))?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT")
        .ok_or_else(|| CalIndexError::IcsParse("no VEVENT in component".to_string()))?;

    let Some(dtstart) = vevent.find_prop("DTSTART") else {
        return Ok(None);
    };
    let start = DatePerhapsTime::try_from(dtstart)
        .map_err(|_| CalIndexError::IcsParse(format!("invalid DTSTART '{}'", dtstart.val)))?;
    let all_day = matches!(start, DatePerhapsTime::Date(_));
    let start = to_local(start);

    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(|end| {
            let end = to_local(end);
            if all_day {
                local_midnight(end.date_naive())
            } else {
                end
            }
        })
        .unwrap_or_else(|| default_end(start, all_day));

    let summary = text_prop(vevent.find_prop("SUMMARY")).unwrap_or_else(|| UNTITLED_EVENT.to_string());
    let description = text_prop(vevent.find_prop("DESCRIPTION")).unwrap_or_default();
    let location = text_prop(vevent.find_prop("LOCATION")).unwrap_or_default();
    let uid = text_prop(vevent.find_prop("UID")).unwrap_or_default();

    Ok(Some(
        Event::new(summary, start, Some(end), all_day)
            .with_uid(uid)
            .with_calendar(calendar_name)
            .with_description(description)
            .with_location(location),
    ))
}

fn text_prop(prop: Option<&Property>) -> Option<String> {
    prop.map(|p| unescape_text(p.val.as_ref()))
}

/// Convert icalendar's DatePerhapsTime to an aware local timestamp.
///
/// Dates become local midnight. TZID-qualified times are read as local
/// wall-clock time since no timezone database is consulted.
fn to_local(dpt: DatePerhapsTime) -> DateTime<FixedOffset> {
    match dpt {
        DatePerhapsTime::Date(d) => local_midnight(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt.with_timezone(&Local).fixed_offset(),
            CalendarDateTime::Floating(naive) => assume_local(naive),
            CalendarDateTime::WithTimezone { date_time, .. } => assume_local(date_time),
        },
    }
}
