//! The event store.
//!
//! [`Store`] owns every loaded [`Source`] and the date [`EventIndex`] built
//! from them. Queries read only the index. Mutations rewrite the affected
//! calendar file (see [`persist`]) and then update the index, so a failed
//! write leaves the in-memory state untouched.
//!
//! All operations are synchronous and run on the caller's thread. Nothing
//! guards against another process editing the same files in between.

pub mod persist;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::error::{CalIndexError, CalIndexResult};
use crate::event::Event;
use crate::ics;
use crate::index::EventIndex;
use crate::source::{DEFAULT_COLOR, Source};

/// How many days `get_upcoming_events` looks ahead.
pub const HORIZON_DAYS: usize = 30;

pub struct Store {
    paths: Vec<PathBuf>,
    sources: Vec<Source>,
    index: EventIndex,
}

impl Store {
    /// Load every existing file in `paths`. Missing or unreadable files are
    /// skipped.
    pub fn load<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut store = Store {
            paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
            sources: Vec::new(),
            index: EventIndex::default(),
        };
        store.reload();
        store
    }

    /// Discard all state and load the configured files again.
    pub fn reload(&mut self) {
        self.sources.clear();
        self.index = EventIndex::default();

        let mut loaded = 0;
        for path in &self.paths {
            if !path.exists() {
                debug!(path = %path.display(), "Calendar file does not exist, skipping");
                continue;
            }

            let source = match Source::load(path, loaded) {
                Ok(source) => source,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Error loading calendar");
                    continue;
                }
            };
            loaded += 1;

            let events = source.events();
            debug!(
                calendar = %source.name,
                path = %path.display(),
                events = events.len(),
                "Loaded calendar"
            );
            for event in events {
                self.index.insert(event);
            }

            if self.source(&source.name).is_some() {
                warn!(calendar = %source.name, path = %path.display(), "Duplicate calendar name");
            }
            self.sources.push(source);
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn index(&self) -> &EventIndex {
        &self.index
    }

    /// Distinct calendar names in load order.
    pub fn calendar_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if !names.contains(&source.name.as_str()) {
                names.push(&source.name);
            }
        }
        names
    }

    pub fn calendar_color(&self, name: &str) -> &'static str {
        self.source(name).map(|s| s.color).unwrap_or(DEFAULT_COLOR)
    }

    /// First source loaded under `name`.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    // QUERIES:

    /// Events on `date`, timed events first, then by start.
    pub fn get_events_for_date(&self, date: NaiveDate) -> Vec<Event> {
        let mut events = self.index.day(date).to_vec();
        events.sort_by_key(|e| (e.all_day, e.start));
        events
    }

    pub fn has_events_on_date(&self, date: NaiveDate) -> bool {
        self.index.has_events_on(date)
    }

    /// Up to `limit` events from `from` onwards, never looking further than
    /// [`HORIZON_DAYS`] days.
    pub fn get_upcoming_events(&self, from: NaiveDate, limit: usize) -> Vec<Event> {
        let mut upcoming = Vec::new();

        for date in from.iter_days().take(HORIZON_DAYS) {
            if upcoming.len() >= limit {
                break;
            }
            let remaining = limit - upcoming.len();
            upcoming.extend(self.get_events_for_date(date).into_iter().take(remaining));
        }

        upcoming
    }

    // MUTATIONS:

    /// Add an event to its calendar file and the index.
    ///
    /// An unknown `calendar_name` is replaced by the first calendar's name.
    pub fn add_event(&mut self, event: &mut Event) -> bool {
        match self.try_add_event(event) {
            Ok(()) => true,
            Err(err) => {
                error!(uid = %event.uid, error = %err, "Error adding event");
                false
            }
        }
    }

    /// Remove the event with `event.uid` from the date `event` starts on.
    /// Other dates are not searched.
    pub fn remove_event(&mut self, event: &Event) -> bool {
        match self.try_remove_event(event) {
            Ok(()) => true,
            Err(err @ CalIndexError::EventNotFound { .. }) => {
                debug!(error = %err, "Nothing to remove");
                false
            }
            Err(err) => {
                error!(uid = %event.uid, error = %err, "Error removing event");
                false
            }
        }
    }

    /// Replace `old` by `new`. See [`Store::try_edit_event`].
    pub fn edit_event(&mut self, old: &Event, new: &mut Event) -> bool {
        match self.try_edit_event(old, new) {
            Ok(()) => true,
            Err(err) => {
                error!(uid = %old.uid, error = %err, "Error editing event");
                false
            }
        }
    }

    pub fn try_add_event(&mut self, event: &mut Event) -> CalIndexResult<()> {
        let position = self.resolve_source(event)?;
        // Index under the same local date a reload will decode.
        event.localize();
        let path = self.sources[position].path.clone();

        let document = persist::rewrite(&path, |document| {
            let component = ics::encode_event(event, document.line_ending())?;
            document.push_event(component);
            Ok(())
        })?;

        self.sources[position].document = document;
        self.index.insert(event.clone());

        info!(
            summary = %event.summary,
            uid = %event.uid,
            path = %path.display(),
            "Added event"
        );
        Ok(())
    }

    pub fn try_remove_event(&mut self, event: &Event) -> CalIndexResult<()> {
        let date = event.date();
        let indexed = self
            .index
            .find(date, &event.uid)
            .ok_or_else(|| CalIndexError::EventNotFound {
                uid: event.uid.clone(),
                date,
            })?;

        let position = self.owning_source(&indexed.calendar_name, &event.uid)?;
        let path = self.sources[position].path.clone();

        let mut removed = 0;
        let document = persist::rewrite(&path, |document| {
            removed = document.remove_events_by_uid(&event.uid);
            Ok(())
        })?;
        if removed == 0 {
            warn!(uid = %event.uid, path = %path.display(), "Event was not in the calendar file");
        }

        self.sources[position].document = document;
        self.index.remove(date, &event.uid);

        info!(
            summary = %event.summary,
            uid = %event.uid,
            path = %path.display(),
            "Removed event"
        );
        Ok(())
    }

    /// Remove `old`, then add `new`.
    ///
    /// When the removal fails nothing is written. When the add fails after a
    /// successful removal, `old` is added back before the error is returned.
    pub fn try_edit_event(&mut self, old: &Event, new: &mut Event) -> CalIndexResult<()> {
        let date = old.date();
        let original = self
            .index
            .find(date, &old.uid)
            .cloned()
            .ok_or_else(|| CalIndexError::EventNotFound {
                uid: old.uid.clone(),
                date,
            })?;

        self.try_remove_event(old)?;

        if let Err(err) = self.try_add_event(new) {
            let mut original = original;
            match self.try_add_event(&mut original) {
                Ok(()) => warn!(uid = %original.uid, "Edit failed, original event restored"),
                Err(restore_err) => {
                    error!(uid = %original.uid, error = %restore_err, "Edit failed and original event could not be restored");
                }
            }
            return Err(err);
        }

        Ok(())
    }

    /// Index of the source holding `uid` among those named `calendar_name`.
    /// Falls back to the first source with that name.
    fn owning_source(&self, calendar_name: &str, uid: &str) -> CalIndexResult<usize> {
        let named = || {
            self.sources
                .iter()
                .enumerate()
                .filter(move |(_, s)| s.name == calendar_name)
        };

        named()
            .find(|(_, s)| s.document.events().any(|e| e.uid() == uid))
            .or_else(|| named().next())
            .map(|(position, _)| position)
            .ok_or_else(|| CalIndexError::CalendarNotFound(calendar_name.to_string()))
    }

    /// Index of the source an event should be written to, renaming the
    /// event's calendar to the first source when it names none.
    fn resolve_source(&self, event: &mut Event) -> CalIndexResult<usize> {
        if let Some(position) = self.sources.iter().position(|s| s.name == event.calendar_name) {
            return Ok(position);
        }

        let first = self.sources.first().ok_or(CalIndexError::NoCalendars)?;
        debug!(
            requested = %event.calendar_name,
            calendar = %first.name,
            "Unknown calendar, using the first one"
        );
        event.calendar_name = first.name.clone();
        Ok(0)
    }
}
