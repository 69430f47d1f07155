use anyhow::{Context, Result};
use calindex_core::time::{is_date_only, local_midnight, parse_date, parse_datetime, today};
use calindex_core::{Event, Store};
use chrono::{DateTime, Duration, FixedOffset};
use owo_colors::OwoColorize;

use crate::render::format_event;

/// Arguments of `calindex add`.
pub struct NewEvent {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub calendar: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub fn run(store: &mut Store, args: NewEvent, json: bool) -> Result<()> {
    let calendar = resolve_calendar(store, args.calendar)?;
    let mut event = build_event(&args.title, &args.start, args.end.as_deref(), args.duration.as_deref())?
        .with_calendar(calendar)
        .with_location(args.location.unwrap_or_default())
        .with_description(args.description.unwrap_or_default());

    store.try_add_event(&mut event)?;

    if json {
        return super::print_json(std::slice::from_ref(&event));
    }

    println!("{}", format!("  Created: {}", format_event(&event, today())).green());
    Ok(())
}

/// The event described by the command line. Date-only start (and end) make
/// it an all-day event.
fn build_event(title: &str, start: &str, end: Option<&str>, duration: Option<&str>) -> Result<Event> {
    let all_day = is_date_only(start) && end.is_none_or(is_date_only);
    let start_time = parse_time(start, all_day)?;

    let end_time = if let Some(end) = end {
        Some(parse_time(end, all_day)?)
    } else if let Some(duration) = duration {
        Some(apply_duration(start_time, duration)?)
    } else {
        None
    };

    Ok(Event::new(title, start_time, end_time, all_day))
}

fn parse_time(input: &str, all_day: bool) -> Result<DateTime<FixedOffset>> {
    if all_day {
        Ok(local_midnight(parse_date(input)?))
    } else {
        Ok(parse_datetime(input)?)
    }
}

fn apply_duration(start: DateTime<FixedOffset>, input: &str) -> Result<DateTime<FixedOffset>> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    let chrono_dur = Duration::from_std(std_dur).context("Duration too large")?;
    Ok(start + chrono_dur)
}

/// An explicit calendar must exist; without one the store picks the first.
fn resolve_calendar(store: &Store, calendar: Option<String>) -> Result<String> {
    let Some(name) = calendar else {
        return Ok(String::new());
    };

    if store.source(&name).is_none() {
        anyhow::bail!(
            "Calendar '{}' not found. Available: {}",
            name,
            store.calendar_names().join(", ")
        );
    }
    Ok(name)
}
