//! Append-only operator audit log (`errors.log` by default).
//!
//! One line per error: `<timestamp> message:<text>`. The file is opened,
//! appended and closed for every line; no handle is held between steps.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Failure to write the audit log is reported through
    /// `tracing` and otherwise ignored so it never aborts a run.
    pub fn record(&self, message: &str) {
        tracing::warn!("{}", message);
        if let Err(e) = self.append(message) {
            tracing::error!(path = %self.path.display(), "could not write error log: {:#}", e);
        }
    }

    fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(file, "{}", format_line(chrono::Local::now(), message))?;
        Ok(())
    }
}

fn format_line<Tz>(now: chrono::DateTime<Tz>, message: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{} message:{}", now.format("%Y-%m-%d %H:%M:%S%.6f"), message)
}
