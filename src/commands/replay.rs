use std::path::Path;

use anyhow::Result;
use calindex_core::time::today;
use calindex_core::{Event, EventRecord};
use chrono::NaiveDate;

use crate::cache::{CachedResponse, JsonFileCache, ResponseCache};
use crate::render::{format_event, format_search_results, format_upcoming};

pub fn run(message_id: &str, cache_path: &Path) -> Result<()> {
    let cache = JsonFileCache::open(cache_path);
    let Some(response) = cache.get(message_id) else {
        anyhow::bail!("No cached response for '{}'", message_id);
    };

    println!("{}", render_response(response, today())?);
    Ok(())
}

/// Text of a cached response, as it was shown when first produced.
pub fn render_response(response: &CachedResponse, today: NaiveDate) -> Result<String> {
    let text = match response {
        CachedResponse::CalendarButton { event, show_date } => {
            let event = Event::from_record(event)?;
            if *show_date {
                format_event(&event, today)
            } else {
                event.to_string()
            }
        }
        CachedResponse::ErrorButton { label } | CachedResponse::SuccessButton { label } => {
            label.clone()
        }
        CachedResponse::SearchResults { events, .. } => {
            format_search_results(&decode(events)?, today)
        }
        CachedResponse::UpcomingEvents { events } => format_upcoming(&decode(events)?, today),
    };
    Ok(text)
}

fn decode(records: &[EventRecord]) -> Result<Vec<Event>> {
    Ok(records.iter().map(Event::from_record).collect::<Result<_, _>>()?)
}
