//! Responses to command blocks, cached by message id so they can be shown
//! again later without touching the calendars.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calindex_core::{Event, EventRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn default_show_date() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CachedResponse {
    CalendarButton {
        event: EventRecord,
        #[serde(default = "default_show_date")]
        show_date: bool,
    },
    ErrorButton {
        label: String,
    },
    SuccessButton {
        label: String,
    },
    SearchResults {
        events: Vec<EventRecord>,
        #[serde(default)]
        event_name: String,
        #[serde(default)]
        start_date_str: String,
        #[serde(default)]
        end_date_str: String,
    },
    UpcomingEvents {
        events: Vec<EventRecord>,
    },
}

impl CachedResponse {
    pub fn error(message: &str) -> Self {
        CachedResponse::ErrorButton {
            label: format!("Error: {message}"),
        }
    }

    pub fn event(event: &Event) -> Self {
        CachedResponse::CalendarButton {
            event: event.to_record(),
            show_date: true,
        }
    }

    pub fn upcoming(events: &[Event]) -> Self {
        CachedResponse::UpcomingEvents {
            events: events.iter().map(Event::to_record).collect(),
        }
    }
}

/// Key-value store for cached responses.
pub trait ResponseCache {
    fn get(&self, message_id: &str) -> Option<&CachedResponse>;
    fn put(&mut self, message_id: &str, response: CachedResponse) -> Result<()>;
}

/// Cache persisted as one JSON object, rewritten on every `put`.
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, CachedResponse>,
}

impl JsonFileCache {
    /// Open the cache at `path`. A missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt response cache");
                BTreeMap::new()
            }),
            Err(_) => {
                debug!(path = %path.display(), "No response cache yet");
                BTreeMap::new()
            }
        };

        JsonFileCache {
            path: path.to_path_buf(),
            entries,
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Could not write {}", self.path.display()))?;
        Ok(())
    }
}

impl ResponseCache for JsonFileCache {
    fn get(&self, message_id: &str) -> Option<&CachedResponse> {
        self.entries.get(message_id)
    }

    fn put(&mut self, message_id: &str, response: CachedResponse) -> Result<()> {
        self.entries.insert(message_id.to_string(), response);
        self.save()
    }
}
