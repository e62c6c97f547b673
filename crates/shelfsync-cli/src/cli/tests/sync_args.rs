//! Tests for `sync` flags and how they override the config.

use super::parse_sync;
use crate::cli::Cli;
use clap::Parser;
use shelfsync_core::config::{FiletypeFilter, SyncConfig};
use shelfsync_core::report::Verbosity;
use std::path::PathBuf;

#[test]
fn cli_parse_sync_defaults() {
    let args = parse_sync(&[]);
    assert_eq!(args.verbosity(), Verbosity::Normal);
    assert!(args.selected_filetypes().is_empty());
    assert!(args.passes.is_none());

    let mut cfg = SyncConfig::default();
    args.apply(&mut cfg);
    assert_eq!(cfg, SyncConfig::default());
}

#[test]
fn cli_parse_sync_short_flags() {
    let args = parse_sync(&["-v", "-n", "-i", "-f", "-d"]);
    assert_eq!(args.verbosity(), Verbosity::Verbose);
    let mut cfg = SyncConfig::default();
    args.apply(&mut cfg);
    assert!(!cfg.verify_existing_files);
    assert!(cfg.ignore_checksum_of_downloads);
    assert!(cfg.force_place_on_checksum_failure);
    assert!(cfg.dry_run);
}

#[test]
fn cli_parse_quiet_and_verbose_conflict() {
    assert!(Cli::try_parse_from(["shelfsync", "sync", "-q", "-v"]).is_err());
    assert_eq!(parse_sync(&["--quiet"]).verbosity(), Verbosity::Quiet);
}

#[test]
fn cli_parse_filter_presets_combine() {
    let args = parse_sync(&["-b", "-p", "-o", "--filetype", ".MP3"]);
    assert_eq!(
        args.selected_filetypes(),
        vec!["epub", "pdf", "mobi", "zip", "rar", "7z", "mp3"]
    );
    let mut cfg = SyncConfig::default();
    args.apply(&mut cfg);
    let filter = cfg.filetype_filter();
    assert!(filter.allows("mp3"));
    assert!(!filter.allows("exe"));
    assert_ne!(filter, FiletypeFilter::All);
}

#[test]
fn cli_parse_overrides_paths_and_passes() {
    let args = parse_sync(&[
        "--passes",
        "5",
        "--download-root",
        "/srv/lib",
        "--scratch-root",
        "/tmp/scratch",
    ]);
    let mut cfg = SyncConfig::default();
    args.apply(&mut cfg);
    assert_eq!(cfg.max_acquire_passes, 5);
    assert_eq!(cfg.download_root, PathBuf::from("/srv/lib"));
    assert_eq!(cfg.scratch_root, PathBuf::from("/tmp/scratch"));
}

#[test]
fn cli_parse_zero_passes_rejected() {
    assert!(Cli::try_parse_from(["shelfsync", "sync", "--passes", "0"]).is_err());
}
