//! Line-oriented command blocks.
//!
//! A block is a language tag plus a few lines of text, e.g.
//!
//! ```text
//! addevent
//! Dentist
//! 2024-03-20 08:00
//! 2024-03-20 08:30
//! ```
//!
//! Executing a block yields the answer text and the response to cache.

use std::fmt;
use std::str::FromStr;

use calindex_core::time::{is_date_only, local_midnight, parse_date, parse_datetime};
use calindex_core::{CalIndexResult, Event, SearchRequest, Store};
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use crate::cache::CachedResponse;
use crate::render::{format_search_results, format_upcoming};

/// How many events an `events` block lists.
pub const UPCOMING_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLang {
    AddEvent,
    RemoveEvent,
    EditEvent,
    SearchEvent,
    Events,
}

impl FromStr for BlockLang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "addevent" => Ok(BlockLang::AddEvent),
            "removeevent" => Ok(BlockLang::RemoveEvent),
            "editevent" => Ok(BlockLang::EditEvent),
            "searchevent" => Ok(BlockLang::SearchEvent),
            "events" => Ok(BlockLang::Events),
            other => Err(format!(
                "Unknown block language '{other}'. Expected addevent, removeevent, editevent, searchevent or events"
            )),
        }
    }
}

impl fmt::Display for BlockLang {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            BlockLang::AddEvent => "addevent",
            BlockLang::RemoveEvent => "removeevent",
            BlockLang::EditEvent => "editevent",
            BlockLang::SearchEvent => "searchevent",
            BlockLang::Events => "events",
        };
        f.write_str(name)
    }
}

/// Result of running one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    pub success: bool,
    pub answer: String,
    pub response: CachedResponse,
}

impl BlockOutcome {
    fn ok(answer: impl Into<String>, response: CachedResponse) -> Self {
        BlockOutcome {
            success: true,
            answer: answer.into(),
            response,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        BlockOutcome {
            success: false,
            response: CachedResponse::error(&message),
            answer: message,
        }
    }
}

pub fn execute(store: &mut Store, lang: BlockLang, block: &str, today: NaiveDate) -> BlockOutcome {
    let lines: Vec<&str> = block.split('\n').map(str::trim).collect();
    debug!(%lang, lines = lines.len(), "Executing block");

    match lang {
        BlockLang::AddEvent => add(store, &lines),
        BlockLang::RemoveEvent => remove(store, &lines),
        BlockLang::EditEvent => edit(store, &lines),
        BlockLang::SearchEvent => search(store, &lines, today),
        BlockLang::Events => {
            let events = store.get_upcoming_events(today, UPCOMING_LIMIT);
            BlockOutcome::ok(format_upcoming(&events, today), CachedResponse::upcoming(&events))
        }
    }
}

/// First event on `date` whose summary equals `title`, ignoring case.
pub fn find_by_title(store: &Store, title: &str, date: NaiveDate) -> Option<Event> {
    let title = title.to_lowercase();
    store
        .get_events_for_date(date)
        .into_iter()
        .find(|e| e.summary.to_lowercase() == title)
}

/// Parse a start/end pair. Both date-only means an all-day event.
pub fn parse_times(
    start: &str,
    end: &str,
) -> CalIndexResult<(DateTime<FixedOffset>, DateTime<FixedOffset>, bool)> {
    if is_date_only(start) && is_date_only(end) {
        let start = local_midnight(parse_date(start)?);
        let end = local_midnight(parse_date(end)?);
        Ok((start, end, true))
    } else {
        Ok((parse_datetime(start)?, parse_datetime(end)?, false))
    }
}

fn add(store: &mut Store, lines: &[&str]) -> BlockOutcome {
    let [name, start, end, ..] = lines else {
        return BlockOutcome::error("Missing information");
    };
    let Ok((start, end, all_day)) = parse_times(start, end) else {
        return BlockOutcome::error("Invalid date format");
    };

    let calendar = store.calendar_names().first().map(|n| n.to_string()).unwrap_or_default();
    let mut event = Event::new(*name, start, Some(end), all_day).with_calendar(calendar);

    if store.add_event(&mut event) {
        BlockOutcome::ok("Event added successfully", CachedResponse::event(&event))
    } else {
        BlockOutcome::error("Failed to add event to calendar")
    }
}

fn remove(store: &mut Store, lines: &[&str]) -> BlockOutcome {
    let [name, date_str, ..] = lines else {
        return BlockOutcome::error("Missing information");
    };
    let Ok(date) = parse_date(date_str) else {
        return BlockOutcome::error("Invalid date format");
    };

    match find_by_title(store, name, date) {
        Some(event) if store.remove_event(&event) => BlockOutcome::ok(
            "Event removed successfully",
            CachedResponse::SuccessButton {
                label: format!("✓ Removed '{name}' from {date_str}"),
            },
        ),
        _ => BlockOutcome::error(format!("Event '{name}' not found on {date_str}")),
    }
}

fn edit(store: &mut Store, lines: &[&str]) -> BlockOutcome {
    let [name, date_str, new_name, new_start, new_end, ..] = lines else {
        return BlockOutcome::error("Missing information");
    };
    let Ok(date) = parse_date(date_str) else {
        return BlockOutcome::error("Invalid date format");
    };
    let Some(original) = find_by_title(store, name, date) else {
        return BlockOutcome::error(format!("Event '{name}' not found on {date_str}"));
    };
    let Ok((start, end, all_day)) = parse_times(new_start, new_end) else {
        return BlockOutcome::error("Invalid date format");
    };

    let mut updated = replacement(&original, new_name, start, end, all_day);
    if store.edit_event(&original, &mut updated) {
        BlockOutcome::ok("Event edited successfully", CachedResponse::event(&updated))
    } else {
        BlockOutcome::error("Failed to edit event in calendar")
    }
}

/// `original` with a new title and times. Uid, calendar, description and
/// location carry over.
pub fn replacement(
    original: &Event,
    summary: &str,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    all_day: bool,
) -> Event {
    Event::new(summary, start, Some(end), all_day)
        .with_uid(original.uid.clone())
        .with_calendar(original.calendar_name.clone())
        .with_description(original.description.clone())
        .with_location(original.location.clone())
}

fn search(store: &Store, lines: &[&str], today: NaiveDate) -> BlockOutcome {
    let field = |i: usize| lines.get(i).copied().unwrap_or_default();
    let (name, start_str, end_str) = (field(0), field(1), field(2));

    let parse = |s: &str| -> CalIndexResult<Option<NaiveDate>> {
        if s.is_empty() { Ok(None) } else { parse_date(s).map(Some) }
    };
    let (start, end) = match (parse(start_str), parse(end_str)) {
        (Ok(start), Ok(end)) => (start, end),
        _ => return BlockOutcome::error("Invalid date format"),
    };
    // An end date alone does not narrow anything.
    let end = start.and(end);

    let request = SearchRequest::new(Some(name.to_string()), start, end);
    match request.execute(store, today) {
        Ok(events) => BlockOutcome::ok(
            format_search_results(&events, today),
            CachedResponse::SearchResults {
                events: events.iter().map(Event::to_record).collect(),
                event_name: name.to_string(),
                start_date_str: start_str.to_string(),
                end_date_str: end_str.to_string(),
            },
        ),
        Err(err) => BlockOutcome::error(err.to_string()),
    }
}
