//! `shelfsync fetch` – refresh the manifest cache from the storefront.

use anyhow::Result;
use shelfsync_core::config;
use shelfsync_core::report::Console;
use shelfsync_core::storefront;

pub fn run_fetch() -> Result<()> {
    let cfg = config::load_or_init()?;
    let docs = storefront::refresh_cache(&cfg, Console::default())?;
    println!("Fetched {} orders into {}", docs.len(), cfg.cache_path.display());
    Ok(())
}
