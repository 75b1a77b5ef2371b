//! farmctl - farm records backend and AI insight tooling
//!
//! - `serve`: run the HTTP API
//! - `insights`: generate insights for one farm from the command line
//! - `config`: inspect the effective configuration

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod env;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "farmctl",
    author,
    version,
    about = "Farm records API server with AI-generated insights"
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::ServeArgs),
    /// Generate AI insights for a farm
    Insights(commands::InsightsArgs),
    /// Inspect configuration (show, path)
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;
    env::load_dotenv();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Insights(args) => commands::run_insights(args).await,
        Commands::Config(args) => commands::run_config(args),
    };

    tracing_setup::shutdown_otel();
    result
}
