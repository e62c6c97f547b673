//! CLI for shelfsync.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use shelfsync_core::config::SyncConfig;
use shelfsync_core::report::Verbosity;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_fetch, run_platforms, run_sync};

/// Filetypes selected by `--books`.
pub const BOOK_FILETYPES: [&str; 3] = ["epub", "pdf", "mobi"];
/// Filetypes selected by `--other`.
pub const OTHER_FILETYPES: [&str; 3] = ["zip", "rar", "7z"];

/// Top-level CLI for shelfsync.
#[derive(Debug, Parser)]
#[command(name = "shelfsync", version)]
#[command(
    about = "shelfsync: keep a local copy of a purchased digital library complete and verified",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Reconcile the library with the manifest: verify, download and file what is missing.
    Sync(SyncArgs),

    /// Fetch the remote manifest and (over)write the cache file.
    Fetch,

    /// List the platforms present in the current manifest.
    Platforms,

    /// Print MD5 and SHA1 of a file, optionally checking them.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Expected MD5 (hex).
        #[arg(long, value_name = "HEX")]
        md5: Option<String>,
        /// Expected SHA1 (hex).
        #[arg(long, value_name = "HEX")]
        sha1: Option<String>,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    /// Only print the final summaries.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print per-file details.
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not verify files that are already present.
    #[arg(short = 'n', long)]
    pub no_checksum_on_local_files: bool,

    /// Do not verify freshly downloaded files.
    #[arg(short = 'i', long)]
    pub ignore_downloaded_checksum: bool,

    /// Place downloads even when verification fails.
    #[arg(short = 'f', long)]
    pub force_place: bool,

    /// Show what would be downloaded without downloading or moving anything.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Only ebooks (epub, pdf, mobi).
    #[arg(short = 'b', long)]
    pub books: bool,

    /// Only epub.
    #[arg(short = 'e', long)]
    pub epub: bool,

    /// Only pdf.
    #[arg(short = 'p', long)]
    pub pdf: bool,

    /// Only mobi.
    #[arg(short = 'm', long)]
    pub mobi: bool,

    /// Only archives (zip, rar, 7z).
    #[arg(short = 'o', long)]
    pub other: bool,

    /// Allow this filetype (repeatable). Combines with the presets above.
    #[arg(long = "filetype", value_name = "EXT")]
    pub filetypes: Vec<String>,

    /// Maximum acquire passes per platform.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub passes: Option<u32>,

    /// Library root (overrides config).
    #[arg(long, value_name = "DIR")]
    pub download_root: Option<PathBuf>,

    /// Scratch directory for downloads in progress (overrides config).
    #[arg(long, value_name = "DIR")]
    pub scratch_root: Option<PathBuf>,
}

impl SyncArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Filetypes selected on the command line; empty means "use the config".
    pub fn selected_filetypes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut add = |ft: &str| {
            let ft = ft.trim().trim_start_matches('.').to_ascii_lowercase();
            if !ft.is_empty() && !out.contains(&ft) {
                out.push(ft);
            }
        };
        if self.books {
            for ft in BOOK_FILETYPES {
                add(ft);
            }
        }
        if self.epub {
            add("epub");
        }
        if self.pdf {
            add("pdf");
        }
        if self.mobi {
            add("mobi");
        }
        if self.other {
            for ft in OTHER_FILETYPES {
                add(ft);
            }
        }
        for ft in &self.filetypes {
            add(ft.as_str());
        }
        out
    }

    /// Applies the one-run overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut SyncConfig) {
        if self.no_checksum_on_local_files {
            cfg.verify_existing_files = false;
        }
        if self.ignore_downloaded_checksum {
            cfg.ignore_checksum_of_downloads = true;
        }
        if self.force_place {
            cfg.force_place_on_checksum_failure = true;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        let filetypes = self.selected_filetypes();
        if !filetypes.is_empty() {
            cfg.allowed_filetypes = filetypes;
        }
        if let Some(n) = self.passes {
            cfg.max_acquire_passes = n;
        }
        if let Some(dir) = &self.download_root {
            cfg.download_root = dir.clone();
        }
        if let Some(dir) = &self.scratch_root {
            cfg.scratch_root = dir.clone();
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Sync(args) => run_sync(&args)?,
            CliCommand::Fetch => run_fetch()?,
            CliCommand::Platforms => run_platforms()?,
            CliCommand::Checksum { path, md5, sha1 } => {
                run_checksum(&path, md5.as_deref(), sha1.as_deref())?
            }
            CliCommand::Completions { shell } => run_completions(shell),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
