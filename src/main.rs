use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use avatarbot::bot;
use avatarbot::config::RawConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,avatarbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing or malformed configuration is fatal before anything connects.
    let config = match RawConfig::from_env().validate() {
        Ok(config) => config,
        Err(issue) => {
            eprintln!("❌ Error: {}", issue);
            eprintln!("💡 Tip: {}", issue.hint());
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");
    info!("  Bot id: {}", config.bot_id());
    info!("  Web App URL: {}", config.web_app_url);

    bot::run(Arc::new(config)).await?;

    info!("Shutting down bot...");
    Ok(())
}
