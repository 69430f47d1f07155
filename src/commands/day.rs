use anyhow::Result;
use calindex_core::time::today;
use calindex_core::Store;
use owo_colors::OwoColorize;

use crate::render::{date_label, Render};

pub fn run(store: &Store, date: Option<&str>, json: bool) -> Result<()> {
    let today = today();
    let date = super::date_arg(date, today)?;
    let events = store.get_events_for_date(date);

    if json {
        return super::print_json(&events);
    }

    println!("{}", date_label(date, today).bold());
    if events.is_empty() {
        println!("  {}", "No events".dimmed());
        return Ok(());
    }
    for event in &events {
        println!("  {}", event.render());
    }

    Ok(())
}
