//! Name and date-range searches over a [`Store`].

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{CalIndexError, CalIndexResult};
use crate::event::Event;
use crate::store::Store;

/// Days on either side of today covered by a name search.
pub const SEARCH_WINDOW_DAYS: i64 = 30;

/// Events within `SEARCH_WINDOW_DAYS` of `today` whose summary contains
/// `name`, ignoring case.
pub fn search_by_name(store: &Store, name: &str, today: NaiveDate) -> Vec<Event> {
    let window = Duration::days(SEARCH_WINDOW_DAYS);
    // Clamped at the ends of the calendar.
    let start = today.checked_sub_signed(window).unwrap_or(NaiveDate::MIN);
    let end = today.checked_add_signed(window).unwrap_or(NaiveDate::MAX);
    search_in_range(store, start, end, Some(name))
}

/// Events starting between `start` and `end` inclusive, optionally filtered
/// by a case-insensitive substring of the summary. Sorted by start.
pub fn search_in_range(
    store: &Store,
    start: NaiveDate,
    end: NaiveDate,
    name: Option<&str>,
) -> Vec<Event> {
    let needle = name.map(str::to_lowercase);

    let mut found: Vec<Event> = start
        .iter_days()
        .take_while(|date| *date <= end)
        .flat_map(|date| store.get_events_for_date(date))
        .filter(|event| matches_name(event, needle.as_deref()))
        .collect();

    found.sort_by_key(|event| event.start);
    found
}

fn matches_name(event: &Event, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => event.summary.to_lowercase().contains(needle),
        None => true,
    }
}

/// A search as typed by a user: any combination of a name and up to two
/// dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SearchRequest {
    pub fn new(name: Option<String>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        // Blank names count as no name.
        let name = name.filter(|n| !n.trim().is_empty());
        SearchRequest { name, start, end }
    }

    pub fn execute(&self, store: &Store, today: NaiveDate) -> CalIndexResult<Vec<Event>> {
        let name = self.name.as_deref();
        debug!(?name, start = ?self.start, end = ?self.end, "Searching events");

        let events = match (self.start, self.end) {
            (Some(start), Some(end)) => search_in_range(store, start, end, name),
            (Some(date), None) | (None, Some(date)) => search_in_range(store, date, date, name),
            (None, None) => match name {
                Some(name) => search_by_name(store, name, today),
                None => return Err(CalIndexError::EmptySearch),
            },
        };

        Ok(events)
    }
}
