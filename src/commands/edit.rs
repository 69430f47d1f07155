use anyhow::Result;
use calindex_core::time::{parse_date, today};
use calindex_core::Store;
use owo_colors::OwoColorize;

use crate::block::{find_by_title, parse_times, replacement};
use crate::render::format_event;

pub fn run(
    store: &mut Store,
    title: &str,
    date: &str,
    new_title: &str,
    start: &str,
    end: &str,
    json: bool,
) -> Result<()> {
    let day = parse_date(date)?;
    let Some(original) = find_by_title(store, title, day) else {
        anyhow::bail!("Event '{}' not found on {}", title, date);
    };
    let (start, end, all_day) = parse_times(start, end)?;

    let mut updated = replacement(&original, new_title, start, end, all_day);
    store.try_edit_event(&original, &mut updated)?;

    if json {
        return super::print_json(std::slice::from_ref(&updated));
    }

    println!("{}", format!("  Updated: {}", format_event(&updated, today())).green());
    Ok(())
}
