//! Subcommand implementations

pub mod config;
pub mod insights;
pub mod serve;

pub use config::{run_config, ConfigArgs};
pub use insights::{run_insights, InsightsArgs};
pub use serve::{run_serve, ServeArgs};

use anyhow::{Context, Result};
use farmctl_server::Settings;

/// Load `~/.farmctl/config.toml` with environment overrides.
pub(crate) fn load_settings() -> Result<Settings> {
    Settings::load().context("Failed to load farmctl configuration")
}
