use anyhow::Result;
use calindex_core::time::{parse_date, today};
use calindex_core::{SearchRequest, Store};

use crate::render::format_search_results;

pub fn run(
    store: &Store,
    name: Option<String>,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;
    let today = today();

    let events = SearchRequest::new(name, from, to).execute(store, today)?;

    if json {
        return super::print_json(&events);
    }

    println!("{}", format_search_results(&events, today));
    Ok(())
}
