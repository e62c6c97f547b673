//! Run driver: manifest → catalog → one repair loop per platform.

use anyhow::Result;

use crate::acquire::{Acquirer, CurlTransport, Transport};
use crate::catalog::{self, Catalog};
use crate::config::SyncConfig;
use crate::error::SetupError;
use crate::error_log::ErrorLog;
use crate::repair::{repair_platform, RepairSettings};
use crate::report::{Console, PlatformReport};
use crate::storefront::{self, ManifestSource};

#[derive(Debug)]
pub struct SyncOutcome {
    pub source: ManifestSource,
    pub reports: Vec<PlatformReport>,
}

impl SyncOutcome {
    pub fn failed_items(&self) -> usize {
        self.reports.iter().map(|r| r.failed.len()).sum()
    }
}

/// Loads and normalizes the manifest. An empty platform set is a setup error.
pub fn load_catalog(cfg: &SyncConfig, console: Console) -> Result<(Catalog, ManifestSource)> {
    let (docs, source) = storefront::load_manifest(cfg, console)?;
    let catalog = catalog::normalize(&docs)?;
    if catalog.platforms.is_empty() {
        return Err(SetupError::NoPlatforms.into());
    }
    tracing::info!(
        entries = catalog.entries.len(),
        platforms = catalog.platforms.len(),
        ?source,
        "catalog loaded"
    );
    console.detail("Platforms detected:");
    for platform in &catalog.platforms {
        console.detail(format!("  {}", platform));
    }
    Ok((catalog, source))
}

/// Full run over the configured manifest source with the curl transport.
pub fn run(cfg: &SyncConfig, console: Console) -> Result<SyncOutcome> {
    cfg.validate()?;
    let (catalog, source) = load_catalog(cfg, console)?;
    let transport = CurlTransport::new(cfg.transport.clone());
    let reports = run_catalog(cfg, &catalog, transport, console)?;
    Ok(SyncOutcome { source, reports })
}

/// Repairs every platform of `catalog` in sorted order, printing each
/// platform's summary as it finishes.
pub fn run_catalog<T: Transport>(
    cfg: &SyncConfig,
    catalog: &Catalog,
    transport: T,
    console: Console,
) -> Result<Vec<PlatformReport>> {
    let settings = RepairSettings::from_config(cfg)?;
    let errors = ErrorLog::new(&cfg.error_log_path);
    let acquirer = Acquirer::new(transport, cfg.scratch_dir()?, console, errors.clone())
        .dry_run(cfg.dry_run);

    let mut reports = Vec::with_capacity(catalog.platforms.len());
    for platform in &catalog.platforms {
        let report = repair_platform(catalog, platform, &settings, &acquirer, console, &errors)?;
        for line in report.summary_lines() {
            console.summary(line);
        }
        reports.push(report);
    }
    console.summary("All done!");
    Ok(reports)
}
