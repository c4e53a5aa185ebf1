use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use news_bots::cli::Cli;
use news_bots::config::{BotConfig, Settings};
use news_bots::pipeline::run_bot;
use news_bots::storage::{SqliteStorage, Storage};
use news_bots::telegram::TelegramNotifier;
use news_bots::utils::http::create_client;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("news_bots=info".parse()?),
        )
        .init();

    info!("{} bot running", cli.source);

    // Missing credentials end the run before anything is fetched
    let settings = Settings::load(cli.config.as_deref())?;
    let config = BotConfig::resolve(cli.source, &settings)?;

    // Failing to open the store is fatal
    let storage = Arc::new(SqliteStorage::new(&config.database_url).await?);
    storage.migrate().await?;

    let client = create_client(&config.user_agent, config.request_timeout_seconds)?;
    let notifier = Arc::new(TelegramNotifier::new(client.clone(), &config.telegram_api_url));

    let summary = run_bot(config, client, storage, notifier).await?;
    if summary.listing_failed {
        info!("Listing unavailable - nothing to do");
    } else {
        info!("All done - {} new items delivered", summary.delivered);
    }

    Ok(())
}
