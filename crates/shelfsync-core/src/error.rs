//! Fatal setup errors.
//!
//! Everything that stops a run before any per-asset work starts. Callers (the
//! CLI) downcast to this type to report setup failures distinctly from other
//! errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("could not read credential file {path}: {source}")]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {0} is empty")]
    EmptyCredential(PathBuf),

    #[error("not logged in, check your cookie")]
    NotLoggedIn,

    #[error("library page has no embedded order data")]
    MissingDataIsland,

    #[error("no order keys found, check your cookie")]
    NoOrderKeys,

    #[error("could not read manifest {path}: {source}")]
    UnreadableManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("no platforms discovered in manifest")]
    NoPlatforms,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
