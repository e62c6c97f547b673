//! CLI parse tests.

use super::{Cli, CliCommand, SyncArgs};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

pub(super) fn parse_sync(args: &[&str]) -> SyncArgs {
    let mut full = vec!["shelfsync", "sync"];
    full.extend_from_slice(args);
    match parse(&full) {
        CliCommand::Sync(a) => a,
        _ => panic!("expected Sync"),
    }
}

mod sync_args;
