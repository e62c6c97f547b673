//! Acquirer: resolve a download URL for an item/filetype and stream it to the
//! scratch directory.
//!
//! Never fatal. Every outcome, including transport and filesystem errors, is an
//! [`Acquisition`] the repair loop decides on.

mod transport;

pub use transport::{CurlTransport, Transport};

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::catalog::{is_placeholder_url, Asset, CatalogEntry, MatchedBy};
use crate::error_log::ErrorLog;
use crate::http::TransferError;
use crate::report::Console;

/// Result of one acquisition attempt.
#[derive(Debug)]
pub enum Acquisition<'a> {
    /// Payload of `asset` written to `temp_path` (`<scratch_root>/<machine_name>`).
    /// The payload is verified against this asset's digests.
    Fetched {
        temp_path: PathBuf,
        bytes: u64,
        asset: &'a Asset,
        matched_by: MatchedBy,
    },
    /// Dry run: what would have been fetched.
    Planned { url: String },
    /// No usable URL for the requested filetype.
    Unresolved,
    /// Transport or scratch storage failure; worth another pass.
    Failed(TransferError),
}

pub struct Acquirer<T: Transport> {
    transport: T,
    scratch_root: PathBuf,
    dry_run: bool,
    console: Console,
    errors: ErrorLog,
}

impl<T: Transport> Acquirer<T> {
    pub fn new(transport: T, scratch_root: impl Into<PathBuf>, console: Console, errors: ErrorLog) -> Self {
        Self {
            transport,
            scratch_root: scratch_root.into(),
            dry_run: false,
            console,
            errors,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Scratch location for an item; one per machine name, truncated on reuse.
    pub fn temp_path(&self, machine_name: &str) -> PathBuf {
        self.scratch_root.join(machine_name)
    }

    /// Resolve and fetch the asset of `entry` for `filetype`.
    pub fn acquire<'a>(&self, entry: &'a CatalogEntry, filetype: &str) -> Acquisition<'a> {
        let (asset, matched_by) = match entry.resolve_asset(filetype) {
            Some(found) => found,
            None => {
                self.report(&format!(
                    "Could not get URL from {} with {} extension",
                    entry.item_human_name, filetype
                ));
                return Acquisition::Unresolved;
            }
        };
        if matched_by == MatchedBy::FallbackLabel {
            tracing::debug!(
                item = %entry.item_machine_name,
                filetype,
                label = %asset.declared_name,
                "url resolved through fallback label"
            );
        }
        if is_placeholder_url(&asset.url) {
            self.report(&format!(
                "Placeholder URL for {} with {} extension: {}",
                entry.item_human_name, filetype, asset.url
            ));
            return Acquisition::Unresolved;
        }

        if self.dry_run {
            self.console.status(format!(
                "Would download {}.{} ({}) from {}",
                entry.item_machine_name, filetype, asset.human_size, asset.url
            ));
            return Acquisition::Planned {
                url: asset.url.clone(),
            };
        }

        let temp_path = self.temp_path(&entry.item_machine_name);
        self.console.status(format!(
            "Downloading: {}.{} ({})",
            entry.item_machine_name, filetype, asset.human_size
        ));
        self.console.detail(format!("URL: {}", asset.url));

        match self.fetch_to(&asset.url, &temp_path) {
            Ok(bytes) => {
                tracing::debug!(bytes, path = %temp_path.display(), "download complete");
                Acquisition::Fetched {
                    temp_path,
                    bytes,
                    asset,
                    matched_by,
                }
            }
            Err(e) => {
                self.report(&format!(
                    "Failure to download file! filetype:{} filename:{} path:{} error:{} transient:{}",
                    filetype,
                    entry.item_machine_name,
                    temp_path.display(),
                    e,
                    e.is_transient()
                ));
                Acquisition::Failed(e)
            }
        }
    }

    fn fetch_to(&self, url: &str, temp_path: &Path) -> Result<u64, TransferError> {
        fs::create_dir_all(&self.scratch_root).map_err(TransferError::Storage)?;
        let mut file = File::create(temp_path).map_err(TransferError::Storage)?;

        let console = self.console;
        let mut last_drawn: Option<u64> = None;
        let mut progress = |done: u64, total: Option<u64>| {
            // curl calls back far more often than the bar can change.
            if last_drawn != Some(done) {
                last_drawn = Some(done);
                console.progress(done, total);
            }
        };
        let result = self.transport.fetch(url, &mut file, &mut progress);
        console.progress_done();
        result
    }

    fn report(&self, msg: &str) {
        self.console.alert(msg);
        self.errors.record(msg);
    }
}
