//! Text rendering for events, listings and calendars.
//!
//! The listing formatters produce plain text (it is also what `block`
//! answers with); the [`Render`] trait adds terminal colors via owo_colors.

use calindex_core::source::Source;
use calindex_core::Event;
use chrono::{Duration, NaiveDate};
use owo_colors::OwoColorize;

/// Search results shown in full; the rest are only counted.
const SEARCH_DISPLAY_LIMIT: usize = 10;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Source {
    fn render(&self) -> String {
        let dot = match hex_to_rgb(self.color) {
            Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
            None => "●".to_string(),
        };
        format!("{} {} {}", dot, self.name.bold(), self.path.display().dimmed())
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let time = if self.all_day {
            format!("{:>13}", "all-day")
        } else {
            format!("{:>13}", time_range(self))
        };

        let mut line = format!("{} {}", time.dimmed(), self.summary);
        if !self.location.is_empty() {
            line.push_str(&format!(" {}", format!("@ {}", self.location).dimmed()));
        }
        if !self.calendar_name.is_empty() {
            line.push_str(&format!(" {}", format!("[{}]", self.calendar_name).dimmed()));
        }
        line
    }
}

/// Parse `#rrggbb`.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// "Today", "Tomorrow", "Yesterday", or the full date.
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        date.format("%A, %B %d, %Y").to_string()
    }
}

/// `HH:MM - HH:MM` in the event's own offset.
pub fn time_range(event: &Event) -> String {
    format!("{} - {}", event.start.format("%H:%M"), event.end.format("%H:%M"))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Listing of upcoming events grouped under date headers.
pub fn format_upcoming(events: &[Event], today: NaiveDate) -> String {
    if events.is_empty() {
        return "No upcoming events found.".to_string();
    }

    let mut lines = vec![
        format!("Next {} upcoming event{}:", events.len(), plural(events.len())),
        String::new(),
    ];

    let mut current_date = None;
    for event in events {
        let date = event.date();
        if current_date != Some(date) {
            lines.push(date_label(date, today));
            current_date = Some(date);
        }

        let time = if event.all_day {
            "All day".to_string()
        } else {
            time_range(event)
        };
        let mut line = format!("  • {} ({})", event.summary, time);
        if !event.location.is_empty() {
            line.push_str(&format!(" at {}", event.location));
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Listing of search results, capped at ten entries.
pub fn format_search_results(events: &[Event], today: NaiveDate) -> String {
    if events.is_empty() {
        return "No events found matching your search criteria.".to_string();
    }

    let mut lines = vec![
        format!("Found {} event{}:", events.len(), plural(events.len())),
        String::new(),
    ];

    for event in events.iter().take(SEARCH_DISPLAY_LIMIT) {
        lines.push(format!("• {}", event.summary));

        let date = date_label(event.date(), today);
        if event.all_day {
            lines.push(format!("  {} (All day)", date));
        } else {
            lines.push(format!("  {} at {}", date, time_range(event)));
        }

        if !event.location.is_empty() {
            lines.push(format!("  Location: {}", event.location));
        }
        if !event.calendar_name.is_empty() {
            lines.push(format!("  Calendar: {}", event.calendar_name));
        }
        lines.push(String::new());
    }

    if events.len() > SEARCH_DISPLAY_LIMIT {
        let rest = events.len() - SEARCH_DISPLAY_LIMIT;
        lines.push(format!("... and {} more event{}", rest, plural(rest)));
    }

    lines.join("\n")
}

/// One-line summary of a single event with its date.
pub fn format_event(event: &Event, today: NaiveDate) -> String {
    let date = date_label(event.date(), today);
    if event.all_day {
        format!("{}: {} (All day)", event.summary, date)
    } else {
        format!("{}: {} at {}", event.summary, date, time_range(event))
    }
}
