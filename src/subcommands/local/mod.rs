//! Subcommands that inspect the local stack or configuration.

mod log;
pub use log::LogCmd;

mod diff;
pub use diff::DiffCmd;

mod config;
pub use config::ConfigCmd;
