use anyhow::Result;
use calindex_core::time::parse_date;
use calindex_core::Store;
use owo_colors::OwoColorize;

use crate::block::find_by_title;

pub fn run(store: &mut Store, title: &str, date: &str) -> Result<()> {
    let day = parse_date(date)?;
    let Some(event) = find_by_title(store, title, day) else {
        anyhow::bail!("Event '{}' not found on {}", title, date);
    };

    store.try_remove_event(&event)?;

    println!("{}", format!("  Removed: {}", event.summary).green());
    Ok(())
}
