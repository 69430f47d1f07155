//! Calendar event value type.
//!
//! An [`Event`] is a plain value: the store hands out clones, and changing one
//! has no effect on the index until it is fed back through an edit or remove.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CalIndexResult;
use crate::time::{local_midnight, parse_datetime};

pub const UNTITLED_EVENT: &str = "Untitled Event";

/// A single calendar occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub summary: String,
    /// Local midnight for all-day events.
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub description: String,
    pub location: String,
    /// Name of the owning calendar
    pub calendar_name: String,
    pub uid: String,
    pub all_day: bool,
}

impl Event {
    /// Create an event, filling in the default end and a fresh uid.
    ///
    /// Without an explicit end, all-day events last one day and timed events
    /// one hour.
    pub fn new(
        summary: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
        all_day: bool,
    ) -> Self {
        let end = end.unwrap_or_else(|| default_end(start, all_day));

        Event {
            summary: summary.into(),
            start,
            end,
            description: String::new(),
            location: String::new(),
            calendar_name: String::new(),
            uid: new_uid(),
            all_day,
        }
    }

    /// Timed event.
    pub fn timed(
        summary: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self::new(summary, start, end, false)
    }

    /// All-day event starting at local midnight of `date`.
    pub fn all_day(summary: impl Into<String>, date: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self::new(summary, local_midnight(date), end.map(local_midnight), true)
    }

    /// Replace the uid; an empty uid keeps the generated one.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        if !uid.is_empty() {
            self.uid = uid;
        }
        self
    }

    pub fn with_calendar(mut self, calendar_name: impl Into<String>) -> Self {
        self.calendar_name = calendar_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Re-express start and end in the local zone, the way they decode
    /// after being written to a file.
    pub fn localize(&mut self) {
        if self.all_day {
            self.start = local_midnight(self.start.date_naive());
            self.end = local_midnight(self.end.date_naive());
        } else {
            self.start = self.start.with_timezone(&Local).fixed_offset();
            self.end = self.end.with_timezone(&Local).fixed_offset();
        }
    }

    /// The date this event is indexed under.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Convert to the flat record used by external caches.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            summary: self.summary.clone(),
            start_time: self.start.to_rfc3339(),
            end_time: self.end.to_rfc3339(),
            description: self.description.clone(),
            location: self.location.clone(),
            calendar_name: self.calendar_name.clone(),
            uid: Some(self.uid.clone()),
            all_day: self.all_day,
        }
    }

    /// Rebuild an event from its flat record.
    pub fn from_record(record: &EventRecord) -> CalIndexResult<Self> {
        let start = parse_datetime(&record.start_time)?;
        let end = parse_datetime(&record.end_time)?;

        Ok(Event::new(record.summary.clone(), start, Some(end), record.all_day)
            .with_uid(record.uid.clone().unwrap_or_default())
            .with_calendar(record.calendar_name.clone())
            .with_description(record.description.clone())
            .with_location(record.location.clone()))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.all_day {
            write!(f, "{}", self.summary)
        } else {
            write!(f, "{} - {}", self.start.format("%H:%M"), self.summary)
        }
    }
}

/// Serialized form of an [`Event`] with ISO-8601 timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub calendar_name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub all_day: bool,
}

pub(crate) fn default_end(start: DateTime<FixedOffset>, all_day: bool) -> DateTime<FixedOffset> {
    if all_day {
        start + Duration::days(1)
    } else {
        start + Duration::hours(1)
    }
}

fn new_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}
