//! `shelfsync platforms` – list the platforms of the current manifest.

use anyhow::Result;
use shelfsync_core::config;
use shelfsync_core::report::{Console, Verbosity};
use shelfsync_core::sync;

pub fn run_platforms() -> Result<()> {
    let cfg = config::load_or_init()?;
    let (catalog, _) = sync::load_catalog(&cfg, Console::new(Verbosity::Quiet))?;
    for platform in &catalog.platforms {
        let items = catalog.for_platform(platform).count();
        println!("{:<12} {} items", platform, items);
    }
    Ok(())
}
