//! User-facing status output and per-platform statistics.

use std::io::Write;

/// Verbosity of stdout output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only the final per-platform summaries.
    Quiet,
    #[default]
    Normal,
    /// Per-file progress, URLs and checksum details.
    Verbose,
}

/// Quiet-aware stdout writer. Every message is also emitted as a `tracing`
/// event so the log file carries the same story.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    verbosity: Verbosity,
}

impl Console {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Status line shown unless quiet.
    pub fn status(&self, msg: impl AsRef<str>) {
        tracing::info!("{}", msg.as_ref());
        if !self.is_quiet() {
            println!("{}", msg.as_ref());
        }
    }

    /// Detail line shown only in verbose mode.
    pub fn detail(&self, msg: impl AsRef<str>) {
        tracing::debug!("{}", msg.as_ref());
        if self.verbosity == Verbosity::Verbose {
            println!("{}", msg.as_ref());
        }
    }

    /// Anomaly or failure shown unless quiet.
    pub fn alert(&self, msg: impl AsRef<str>) {
        tracing::warn!("{}", msg.as_ref());
        if !self.is_quiet() {
            println!("{}", msg.as_ref());
        }
    }

    /// Always printed (final summaries).
    pub fn summary(&self, msg: impl AsRef<str>) {
        tracing::info!("{}", msg.as_ref());
        println!("{}", msg.as_ref());
    }

    /// Redraws a 50-column progress bar on the current line.
    pub fn progress(&self, done: u64, total: Option<u64>) {
        if self.is_quiet() {
            return;
        }
        let line = match total {
            Some(t) if t > 0 => {
                let filled = ((done.min(t) * 50) / t) as usize;
                format!("\r[{}{}]", "#".repeat(filled), ".".repeat(50 - filled))
            }
            _ => format!("\r{} bytes", done),
        };
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }

    /// Ends a progress line.
    pub fn progress_done(&self) {
        if !self.is_quiet() {
            println!();
        }
    }
}

/// Statistics for one platform, returned by the repair loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformReport {
    pub platform: String,
    pub local_files: usize,
    pub filename_matches: usize,
    pub filename_misses: usize,
    /// Assets with an unusable (placeholder) URL.
    pub anomalies: usize,
    /// Local files not accounted for by any catalog asset.
    pub unexplained: usize,
    pub checksum_passes: usize,
    pub checksum_failures: usize,
    /// Work items downloaded, verified and placed.
    pub acquired: usize,
    /// Work items dropped by the filetype allow-list.
    pub skipped: usize,
    /// Work items that would have been fetched in a dry run.
    pub planned: usize,
    /// Work items that ended in a final failure (`machine_name.filetype`).
    pub failed: Vec<String>,
    /// Acquire passes actually run.
    pub passes: u32,
}

impl PlatformReport {
    pub fn new(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            ..Self::default()
        }
    }

    /// Lines printed after a platform has been reconciled.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Currently have {} local files in folder {}",
                self.local_files, self.platform
            ),
            format!("Found {} matches on filename", self.filename_matches),
            format!("Found {} unique missing files", self.filename_misses),
            format!("Found {} verified hashes", self.checksum_passes),
            format!("Found {} failed hashes", self.checksum_failures),
            format!(
                "Acquired {} files, {} failed, {} skipped by filter",
                self.acquired,
                self.failed.len(),
                self.skipped
            ),
        ];
        if self.planned > 0 {
            lines.push(format!("Dry run: {} files would be downloaded", self.planned));
        }
        if self.anomalies > 0 {
            lines.push(format!("{} assets with unusable URLs", self.anomalies));
        }
        if self.unexplained > 0 {
            lines.push(format!("{} local files not in the catalog", self.unexplained));
        }
        for name in &self.failed {
            lines.push(format!("  failed: {}", name));
        }
        lines
    }
}
