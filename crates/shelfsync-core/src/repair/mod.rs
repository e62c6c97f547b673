//! Per-platform repair loop.
//!
//! SCAN → MATCH → VERIFY-EXISTING → BUILD-WORKSET → ACQUIRE-PASS* → DONE.
//! The first four steps run once; acquire passes repeat over the shrinking work
//! set until it is empty or `max_passes` is reached. Nothing survives a
//! platform except the returned [`PlatformReport`].

mod workset;

pub use workset::WorkItem;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::acquire::{Acquirer, Acquisition, Transport};
use crate::catalog::{Asset, Catalog};
use crate::checksum::{self, FileCheck};
use crate::config::{FiletypeFilter, SyncConfig};
use crate::error_log::ErrorLog;
use crate::inventory;
use crate::matcher::{self, LocalMatch};
use crate::placement;
use crate::report::{Console, PlatformReport};

/// Knobs of one repair run (config plus CLI overrides).
#[derive(Debug, Clone)]
pub struct RepairSettings {
    pub library_root: PathBuf,
    pub filter: FiletypeFilter,
    pub verify_existing: bool,
    pub ignore_download_checksum: bool,
    pub force_place: bool,
    pub max_passes: u32,
}

impl RepairSettings {
    pub fn from_config(cfg: &SyncConfig) -> Result<Self> {
        Ok(Self {
            library_root: cfg.library_root()?,
            filter: cfg.filetype_filter(),
            verify_existing: cfg.verify_existing_files,
            ignore_download_checksum: cfg.ignore_checksum_of_downloads,
            force_place: cfg.force_place_on_checksum_failure,
            max_passes: cfg.max_acquire_passes,
        })
    }
}

/// Outcome of verifying files that were already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingCheck {
    pub passed: usize,
    /// Present files that failed (or could not be read); re-acquired.
    pub failed: BTreeSet<WorkItem>,
}

/// What happened to a work item in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Acquired,
    Skipped,
    Planned,
    /// Terminal; not retried.
    Failed,
    /// Kept for the next pass.
    Retry,
}

/// Shared output channels of a repair run.
struct Sink<'a> {
    console: Console,
    errors: &'a ErrorLog,
}

impl Sink<'_> {
    fn report(&self, msg: &str) {
        self.console.alert(msg);
        self.errors.record(msg);
    }
}

/// Reconcile one platform: verify what exists, then fetch, verify and place
/// what is missing or broken.
pub fn repair_platform<T: Transport>(
    catalog: &Catalog,
    platform: &str,
    settings: &RepairSettings,
    acquirer: &Acquirer<T>,
    console: Console,
    errors: &ErrorLog,
) -> Result<PlatformReport> {
    let sink = Sink { console, errors };
    let mut report = PlatformReport::new(platform);
    console.detail(format!("Processing platform: {}", platform));

    // SCAN, MATCH
    let local = inventory::scan(&settings.library_root, platform)?;
    let outcome = matcher::match_platform(catalog.for_platform(platform), &local);
    for anomaly in &outcome.anomalies {
        sink.report(&format!(
            "No filetype in URL for {} ({}): {}",
            anomaly.entry.item_human_name, anomaly.asset.declared_name, anomaly.asset.url
        ));
    }
    report.local_files = outcome.stats.local_files;
    report.filename_matches = outcome.stats.matches;
    report.filename_misses = outcome.stats.misses;
    report.anomalies = outcome.stats.anomalies;
    report.unexplained = outcome.stats.unexplained;

    // VERIFY-EXISTING
    let existing = if settings.verify_existing {
        verify_existing(&outcome.matches, &settings.library_root, platform, &sink)
    } else {
        ExistingCheck::default()
    };
    report.checksum_passes = existing.passed;
    report.checksum_failures = existing.failed.len();

    // BUILD-WORKSET
    let mut work = workset::build(outcome.misses, existing.failed);

    // ACQUIRE-PASS*
    while !work.is_empty() && report.passes < settings.max_passes {
        report.passes += 1;
        console.status(format!(
            "Pass {}/{} for {}: {} files to acquire",
            report.passes,
            settings.max_passes,
            platform,
            work.len()
        ));
        let items: Vec<WorkItem> = work.iter().cloned().collect();
        for item in items {
            let step = acquire_item(catalog, platform, &item, settings, acquirer, &sink);
            tracing::debug!(item = %item, ?step, pass = report.passes, "work item processed");
            match step {
                Step::Retry => continue,
                Step::Acquired => report.acquired += 1,
                Step::Skipped => report.skipped += 1,
                Step::Planned => report.planned += 1,
                Step::Failed => report.failed.push(item.to_string()),
            }
            work.remove(&item);
        }
    }

    // DONE
    for item in work {
        sink.report(&format!(
            "FAILED to download after {} passes: {}",
            report.passes, item
        ));
        report.failed.push(item.to_string());
    }
    report.failed.sort();
    Ok(report)
}

/// Verify every filename match against its asset's digests.
fn verify_existing(
    matches: &[LocalMatch<'_>],
    root: &Path,
    platform: &str,
    sink: &Sink<'_>,
) -> ExistingCheck {
    let mut out = ExistingCheck::default();
    for m in matches {
        let path = placement::target_dir(root, platform, &m.filetype).join(&m.filename);
        sink.console.detail(format!("Checking: {}", path.display()));
        let item = WorkItem::new(&m.entry.item_machine_name, &m.filetype);
        match checksum::check_file(&path, m.asset) {
            Ok(check) if judge(&check, &item, sink) => out.passed += 1,
            Ok(_) => {
                out.failed.insert(item);
            }
            Err(e) => {
                sink.report(&format!("{:#}", e));
                out.failed.insert(item);
            }
        }
    }
    out
}

fn acquire_item<T: Transport>(
    catalog: &Catalog,
    platform: &str,
    item: &WorkItem,
    settings: &RepairSettings,
    acquirer: &Acquirer<T>,
    sink: &Sink<'_>,
) -> Step {
    if !settings.filter.allows(&item.filetype) {
        sink.console.detail(format!("Skipping {} (filetype filter)", item));
        return Step::Skipped;
    }
    let entry = match catalog.find(platform, &item.machine_name) {
        Some(e) => e,
        None => {
            sink.report(&format!("Item {} not found in catalog", item.machine_name));
            return Step::Failed;
        }
    };

    let (temp_path, asset) = match acquirer.acquire(entry, &item.filetype) {
        Acquisition::Fetched { temp_path, asset, .. } => (temp_path, asset),
        Acquisition::Planned { .. } => return Step::Planned,
        Acquisition::Unresolved => return Step::Failed,
        Acquisition::Failed(_) => return Step::Retry,
    };

    if !settings.ignore_download_checksum {
        match verify_download(asset, item, &temp_path, sink) {
            Ok(true) => {}
            Ok(false) if settings.force_place => {
                sink.report(&format!(
                    "Placing {} despite failed checksum; integrity not guaranteed",
                    item
                ));
            }
            Ok(false) => return Step::Retry,
            Err(e) => {
                sink.report(&format!("{:#}", e));
                return Step::Retry;
            }
        }
    }

    match placement::place(
        &temp_path,
        &settings.library_root,
        platform,
        &entry.item_machine_name,
        &item.filetype,
    ) {
        Ok(final_path) => {
            sink.console.detail(format!("Placed {}", final_path.display()));
            Step::Acquired
        }
        Err(e) => {
            sink.report(&format!("Failed to place {}: {:#}", item, e));
            Step::Failed
        }
    }
}

/// Checks a fetched payload against the digests of the asset it was fetched from.
fn verify_download(asset: &Asset, item: &WorkItem, path: &Path, sink: &Sink<'_>) -> Result<bool> {
    let check = checksum::check_file(path, asset)?;
    Ok(judge(&check, item, sink))
}

/// Applies the combining policy and logs every failing individual check.
fn judge(check: &FileCheck, item: &WorkItem, sink: &Sink<'_>) -> bool {
    for v in check.failures() {
        sink.report(&format!(
            "{} verification failed! filetype:{} filename:{} org_checksum:{} calculated_checksum:{}",
            v.algorithm, item.filetype, item.machine_name, v.declared, v.computed
        ));
    }
    let passed = check.passed();
    if !passed {
        sink.report(&format!(
            "Both MD5 and SHA1 verification failed! filetype:{} filename:{}",
            item.filetype, item.machine_name
        ));
    } else {
        sink.console.detail(format!("Verified {}", item));
    }
    passed
}
