pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;
pub use config::AppConfig;
pub use crate::core::{broadcast::Broadcaster, snapshot::SnapshotStore};
pub use utils::error::{DashboardError, Result};
