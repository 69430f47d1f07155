pub mod add;
pub mod block;
pub mod calendars;
pub mod day;
pub mod edit;
pub mod remove;
pub mod replay;
pub mod search;
pub mod upcoming;

use anyhow::Result;
use calindex_core::time::parse_date;
use calindex_core::Event;
use chrono::NaiveDate;

/// Print events as a JSON array of records.
pub fn print_json(events: &[Event]) -> Result<()> {
    let records: Vec<_> = events.iter().map(Event::to_record).collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Parse an optional YYYY-MM-DD argument, falling back to `default`.
pub fn date_arg(input: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match input {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(default),
    }
}
