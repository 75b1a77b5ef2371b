//! HTTP server command

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use farmctl_server::clients::{
    AiError, InsightGenerator, ObjectStorage, OpenAiClient, StorageError, SupabaseAuth,
    SupabaseStorage, UnconfiguredGenerator, UnconfiguredStorage,
};
use farmctl_server::config::{AiSettings, SupabaseSettings};
use farmctl_server::db::create_pool;
use farmctl_server::http::{run_server, AppState, ServerConfig};

use super::load_settings;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: FARMCTL_BIND or 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// AI client, or a stand-in that fails every call when no key is configured
fn ai_client(settings: &AiSettings) -> Result<Arc<dyn InsightGenerator>> {
    match OpenAiClient::new(settings) {
        Ok(client) => {
            tracing::info!(model = %settings.model, "AI provider configured");
            Ok(Arc::new(client))
        }
        Err(AiError::NotConfigured) => {
            tracing::warn!("OPENAI_API_KEY not set; insight generation will fail");
            Ok(Arc::new(UnconfiguredGenerator))
        }
        Err(e) => Err(e).context("Failed to build AI client"),
    }
}

/// Storage client, or a stand-in that rejects uploads when unconfigured
fn storage_client(settings: &SupabaseSettings) -> Result<Arc<dyn ObjectStorage>> {
    match SupabaseStorage::new(settings) {
        Ok(client) => Ok(Arc::new(client)),
        Err(StorageError::NotConfigured(key)) => {
            tracing::warn!("{} not set; uploads will fail", key);
            Ok(Arc::new(UnconfiguredStorage))
        }
        Err(e) => Err(e).context("Failed to build storage client"),
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut settings = load_settings()?;
    if let Some(bind) = args.bind {
        settings.server.bind_addr = bind;
    }
    if args.cors_permissive {
        settings.server.cors_permissive = true;
    }
    if let Some(url) = args.database_url {
        settings.server.database_url = Some(url);
    }

    let database_url = settings.database_url().context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.farmctl/.env",
    )?;

    let pool = create_pool(database_url)
        .await
        .context("Failed to create database pool")?;
    let auth = SupabaseAuth::new(&settings.supabase)
        .context("Authentication needs SUPABASE_URL and SUPABASE_ANON_KEY")?;

    let state = AppState {
        pool,
        auth: Arc::new(auth),
        ai: ai_client(&settings.ai)?,
        storage: storage_client(&settings.supabase)?,
    };
    let config = ServerConfig {
        bind_addr: settings.server.bind_addr,
        cors_permissive: settings.server.cors_permissive,
    };

    tracing::info!("Starting farmctl server on {}", config.bind_addr);

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
