//! Date-bucketed event index.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::event::Event;

/// Events grouped by the date they start on, in insertion order per day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventIndex {
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

impl EventIndex {
    pub fn insert(&mut self, event: Event) {
        self.days.entry(event.date()).or_default().push(event);
    }

    /// Events on `date`, unsorted.
    pub fn day(&self, date: NaiveDate) -> &[Event] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn find(&self, date: NaiveDate, uid: &str) -> Option<&Event> {
        self.day(date).iter().find(|e| e.uid == uid)
    }

    /// Remove the first event on `date` with this uid, dropping the bucket
    /// once it is empty.
    pub fn remove(&mut self, date: NaiveDate, uid: &str) -> Option<Event> {
        let bucket = self.days.get_mut(&date)?;
        let position = bucket.iter().position(|e| e.uid == uid)?;
        let removed = bucket.remove(position);
        if bucket.is_empty() {
            self.days.remove(&date);
        }
        Some(removed)
    }

    pub fn has_events_on(&self, date: NaiveDate) -> bool {
        self.days.get(&date).is_some_and(|bucket| !bucket.is_empty())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
