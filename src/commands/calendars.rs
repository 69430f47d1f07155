use anyhow::Result;
use calindex_core::Store;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::render::Render;

#[derive(Serialize)]
struct CalendarInfo<'a> {
    name: &'a str,
    path: String,
    color: &'a str,
    events: usize,
}

pub fn run(store: &Store, json: bool) -> Result<()> {
    let counts: Vec<usize> = store.sources().iter().map(|s| s.events().len()).collect();

    if json {
        let infos: Vec<_> = store
            .sources()
            .iter()
            .zip(&counts)
            .map(|(source, &events)| CalendarInfo {
                name: &source.name,
                path: source.path.display().to_string(),
                color: source.color,
                events,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for (source, count) in store.sources().iter().zip(counts) {
        let label = format!("({} event{})", count, if count == 1 { "" } else { "s" });
        println!("{} {}", source.render(), label.dimmed());
    }

    Ok(())
}
