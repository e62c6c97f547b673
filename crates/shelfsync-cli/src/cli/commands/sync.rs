//! `shelfsync sync` – reconcile the local library with the manifest.

use anyhow::Result;
use shelfsync_core::config;
use shelfsync_core::report::Console;
use shelfsync_core::sync;

use crate::cli::SyncArgs;

pub fn run_sync(args: &SyncArgs) -> Result<()> {
    let mut cfg = config::load_or_init()?;
    args.apply(&mut cfg);
    cfg.validate()?;
    tracing::debug!("effective config: {:?}", cfg);

    let console = Console::new(args.verbosity());
    let outcome = sync::run(&cfg, console)?;
    tracing::info!(
        platforms = outcome.reports.len(),
        failed = outcome.failed_items(),
        "sync finished"
    );
    Ok(())
}
