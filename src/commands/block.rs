use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use calindex_core::time::today;
use calindex_core::Store;
use chrono::NaiveDate;
use tracing::warn;

use crate::block::{self, BlockLang};
use crate::cache::{JsonFileCache, ResponseCache};

/// Run the block on stdin and print its answer. With a message id the
/// response is cached for `replay`.
pub fn run(store: &mut Store, lang: &str, message_id: Option<&str>, cache_path: &Path) -> Result<()> {
    let lang: BlockLang = lang.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Could not read block from stdin")?;

    let answer = answer_block(store, lang, &input, message_id, cache_path, today())?;
    println!("{answer}");
    Ok(())
}

/// Execute `input` and cache the response under `message_id`. A failed
/// block is still cached, then returned as an error carrying its answer.
fn answer_block(
    store: &mut Store,
    lang: BlockLang,
    input: &str,
    message_id: Option<&str>,
    cache_path: &Path,
    today: NaiveDate,
) -> Result<String> {
    let outcome = block::execute(store, lang, input.trim_end_matches('\n'), today);

    if let Some(id) = message_id {
        let mut cache = JsonFileCache::open(cache_path);
        if let Err(e) = cache.put(id, outcome.response.clone()) {
            warn!(error = %e, "Could not cache response");
        }
    }

    if !outcome.success {
        anyhow::bail!("{}", outcome.answer);
    }
    Ok(outcome.answer)
}
