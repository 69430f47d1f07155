use anyhow::Result;
use calindex_core::time::today;
use calindex_core::Store;

use crate::render::format_upcoming;

pub fn run(store: &Store, from: Option<&str>, limit: usize, json: bool) -> Result<()> {
    let today = today();
    let from = super::date_arg(from, today)?;
    let events = store.get_upcoming_events(from, limit);

    if json {
        return super::print_json(&events);
    }

    println!("{}", format_upcoming(&events, today));
    Ok(())
}
