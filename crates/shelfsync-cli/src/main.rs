use shelfsync_core::{logging, SetupError};

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; a broken state dir must not stop a sync.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable ({:#}), logging to stderr", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        if err.chain().any(|e| e.is::<SetupError>()) {
            eprintln!("setup error: {:#}", err);
            std::process::exit(2);
        }
        eprintln!("shelfsync error: {:#}", err);
        std::process::exit(1);
    }
}
