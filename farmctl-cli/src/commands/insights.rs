//! One-off insight generation for a single farm

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use farmctl_server::clients::OpenAiClient;
use farmctl_server::db::create_pool;
use farmctl_server::services::{InsightService, PgInsightStore};

use super::load_settings;

/// Arguments for the insights command
#[derive(Parser, Debug)]
pub struct InsightsArgs {
    /// Farm to generate insights for
    #[arg(long)]
    pub farm_id: Uuid,

    /// Print the prompt and normalized insights without storing them
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run_insights(args: InsightsArgs) -> Result<()> {
    let settings = load_settings()?;
    let database_url = settings
        .database_url()
        .context("DATABASE_URL not set. Set it in the environment or ~/.farmctl/.env")?;

    let pool = create_pool(database_url)
        .await
        .context("Failed to create database pool")?;
    let ai = OpenAiClient::new(&settings.ai).context("Failed to build AI client")?;
    let store = PgInsightStore::new(pool);
    let service = InsightService::new(&store, &ai);

    let farm = service
        .authorized_farm(args.farm_id, None)
        .await
        .with_context(|| format!("Could not load farm {}", args.farm_id))?;
    tracing::info!(farm = %farm.name, "Generating insights");

    let draft = service
        .draft_farm_insights(farm)
        .await
        .context("Insight generation failed")?;

    if args.dry_run {
        println!("--- system prompt ---\n{}\n", draft.prompt.system);
        println!("--- user prompt ---\n{}\n", draft.prompt.user);
        println!("--- normalized insights ({}) ---", draft.insights.len());
        println!("{}", serde_json::to_string_pretty(&draft.insights)?);
        return Ok(());
    }

    let stored = service
        .store_draft(draft)
        .await
        .context("Failed to store insights")?;
    println!("Stored {} insight(s) for farm {}", stored.len(), args.farm_id);
    for insight in &stored {
        println!(
            "  [{}] {} ({:.0}% confidence)",
            insight.severity,
            insight.title,
            insight.confidence * 100.0
        );
    }
    Ok(())
}
