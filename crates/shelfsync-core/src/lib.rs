pub mod config;
pub mod error;
pub mod logging;

pub mod acquire;
pub mod catalog;
pub mod checksum;
pub mod error_log;
pub mod http;
pub mod inventory;
pub mod matcher;
pub mod placement;
pub mod repair;
pub mod report;
pub mod storefront;
pub mod sync;

pub use error::SetupError;
