mod catalog;
mod config;
mod platform;
mod presentation;
mod router;
mod scheduler;
mod selector;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::platform::telegram::TelegramMessenger;
use crate::router::Router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let default_filter = if config.bot.debug {
        "info,cardbot=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Configuration loaded from: {}", config_path.display());
    info!("  Images: {}", config.images.path.display());
    info!("  Poll timeout: {}s", config.bot.timeout);
    info!("  Daily reminder: {}", config.images.daily_reminder);

    let catalog = Arc::new(Catalog::load(&config.images.path).await);

    let bot = Bot::new(&config.bot.token);
    let me = bot
        .get_me()
        .await
        .context("Failed to authorize with the bot token")?;
    info!("Authorized on account {}", me.username());

    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let router = Arc::new(Router::new(catalog, config.messages.clone(), messenger));
    router.register_commands().await;

    let mut reminders = if config.images.daily_reminder {
        let cron = &config.images.reminder_cron;
        Some(scheduler::start_daily_reminder(cron, router.clone()).await?)
    } else {
        None
    };

    info!("Bot is starting...");
    platform::telegram::run(bot, router, Duration::from_secs(config.bot.timeout)).await?;

    if let Some(scheduler) = reminders.as_mut() {
        scheduler.shutdown().await?;
    }

    Ok(())
}
