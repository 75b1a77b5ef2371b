//! Configuration inspection

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farmctl_server::Settings;

use super::load_settings;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (secrets masked)
    Show,
    /// Print the config file location
    Path,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let settings = load_settings()?;
            let rendered = toml::to_string_pretty(&settings.redacted())
                .context("Failed to render configuration")?;
            print!("{}", rendered);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path().context("Could not determine home directory")?;
            let note = if path.exists() { "" } else { " (not created)" };
            println!("{}{}", path.display(), note);
        }
    }
    Ok(())
}
