use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// Wildcard entry in `allowed_filetypes` meaning "every filetype".
pub const ALL_FILETYPES: &str = "*";

/// Curl transfer options (optional `[transport]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard cap per transfer in seconds (0 = none).
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            user_agent: concat!("shelfsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Where the storefront lives (optional `[storefront]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub base_url: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.humblebundle.com".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/shelfsync/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Library root; platform directories are created below it. Empty = current directory.
    pub download_root: PathBuf,
    /// Where downloads land before verification. Empty = current directory.
    pub scratch_root: PathBuf,
    /// Filetypes eligible for download; `["*"]` allows everything.
    pub allowed_filetypes: Vec<String>,
    /// Checksum files that already exist locally.
    pub verify_existing_files: bool,
    /// Skip checksum verification of fresh downloads.
    pub ignore_checksum_of_downloads: bool,
    /// Place downloads even when verification fails (bypasses the integrity guarantee).
    pub force_place_on_checksum_failure: bool,
    /// Upper bound on acquire passes per platform.
    pub max_acquire_passes: u32,
    /// Reconcile only: no downloads, no placement.
    pub dry_run: bool,
    /// Session cookie file (JSON object or raw `Cookie` header value on the first line).
    pub cookie_path: PathBuf,
    /// Offline manifest cache; used as the sole source when present.
    pub cache_path: PathBuf,
    /// Append-only audit log.
    pub error_log_path: PathBuf,
    /// Write the cache after a successful remote fetch.
    pub write_cache: bool,
    pub storefront: StorefrontConfig,
    pub transport: TransportConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_root: PathBuf::new(),
            scratch_root: PathBuf::new(),
            allowed_filetypes: vec![ALL_FILETYPES.to_string()],
            verify_existing_files: true,
            ignore_checksum_of_downloads: false,
            force_place_on_checksum_failure: false,
            max_acquire_passes: 3,
            dry_run: false,
            cookie_path: PathBuf::from("cookie.txt"),
            cache_path: PathBuf::from("data.json"),
            error_log_path: PathBuf::from("errors.log"),
            write_cache: true,
            storefront: StorefrontConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.max_acquire_passes == 0 {
            return Err(SetupError::InvalidConfig(
                "max_acquire_passes must be at least 1".to_string(),
            ));
        }
        if self.allowed_filetypes.is_empty() {
            return Err(SetupError::InvalidConfig(
                "allowed_filetypes is empty; use [\"*\"] to allow everything".to_string(),
            ));
        }
        Ok(())
    }

    /// `download_root`, or the current directory when unset.
    pub fn library_root(&self) -> Result<PathBuf> {
        or_current_dir(&self.download_root)
    }

    /// `scratch_root`, or the current directory when unset.
    pub fn scratch_dir(&self) -> Result<PathBuf> {
        or_current_dir(&self.scratch_root)
    }

    pub fn filetype_filter(&self) -> FiletypeFilter {
        FiletypeFilter::from_list(&self.allowed_filetypes)
    }
}

fn or_current_dir(p: &Path) -> Result<PathBuf> {
    if p.as_os_str().is_empty() {
        std::env::current_dir().context("current directory")
    } else {
        Ok(p.to_path_buf())
    }
}

/// Filetype allow-list applied to work items before acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiletypeFilter {
    All,
    Only(BTreeSet<String>),
}

impl FiletypeFilter {
    pub fn from_list<S: AsRef<str>>(list: &[S]) -> Self {
        if list.is_empty() || list.iter().any(|s| s.as_ref().trim() == ALL_FILETYPES) {
            return FiletypeFilter::All;
        }
        FiletypeFilter::Only(
            list.iter()
                .map(|s| s.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn allows(&self, filetype: &str) -> bool {
        match self {
            FiletypeFilter::All => true,
            FiletypeFilter::Only(set) => set.contains(&filetype.to_ascii_lowercase()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("shelfsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SyncConfig = toml::from_str(&data)
        .map_err(|e| SetupError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
    cfg.validate()?;
    Ok(cfg)
}
