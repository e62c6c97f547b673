//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod fetch;
mod platforms;
mod sync;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use platforms::run_platforms;
pub use sync::run_sync;
