use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that takes priority over `[bot] token`.
pub const TOKEN_ENV_VAR: &str = "BOT_TOKEN";

/// Token value shipped in the example config.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bot token is not set; set BOT_TOKEN or [bot] token in the config file")]
    MissingToken,
    #[error("bot token is still the placeholder value; set BOT_TOKEN or [bot] token")]
    PlaceholderToken,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    /// Turns on debug logging for the bot itself
    #[serde(default)]
    pub debug: bool,
    /// Long-poll timeout in seconds (0 means default)
    #[serde(default)]
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessagesConfig {
    #[serde(default = "default_welcome")]
    pub welcome: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_about")]
    pub about: String,
    #[serde(default = "default_reminder")]
    pub reminder: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub daily_reminder: bool,
    /// Six-field cron expression (with seconds) for the reminder broadcast
    #[serde(default = "default_reminder_cron")]
    pub reminder_cron: String,
}

fn default_welcome() -> String {
    "✨ *Welcome!* ✨\n\nEvery day a new message is waiting for you. \
     Press *Message of the Day* to receive yours."
        .to_string()
}

fn default_help() -> String {
    "🆘 *Help*\n\n\
     /card - your message of the day\n\
     /random - a random message\n\
     /about - about this bot\n\
     /help - this help"
        .to_string()
}

fn default_about() -> String {
    "📖 *About*\n\nA bot that sends you a message card every day.".to_string()
}

fn default_reminder() -> String {
    "🌅 *Good morning!*\n\n\
     Don't forget to pick up your message of the day for today's inspiration and support.\n\n\
     Let the energy of the message fill your day! ✨"
        .to_string()
}

fn default_images_path() -> PathBuf {
    PathBuf::from("images")
}

fn default_reminder_cron() -> String {
    "0 0 9 * * *".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            help: default_help(),
            about: default_about(),
            reminder: default_reminder(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            path: default_images_path(),
            daily_reminder: false,
            reminder_cron: default_reminder_cron(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        Self::from_toml(&content, env_token)
    }

    /// Parse config text, apply the token override and defaults, then validate.
    pub fn from_toml(content: &str, env_token: Option<String>) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).context("Failed to parse config file")?;

        if let Some(token) = env_token.filter(|t| !t.is_empty()) {
            config.bot.token = token;
        }

        config.validate()?;

        if config.images.path.as_os_str().is_empty() {
            config.images.path = default_images_path();
        }
        if config.bot.timeout == 0 {
            config.bot.timeout = default_timeout();
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let token = self.bot.token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }
        Ok(())
    }
}
