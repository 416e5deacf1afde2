//! Environment configuration.

use std::time::Duration;

use encore_core::ids::UserId;
use url::Url;

use crate::error::AppError;

/// Everything the server reads from its environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Lavalink REST base URL.
    pub lavalink_url: Url,
    /// Lavalink password.
    pub lavalink_password: String,
    /// The bot's own user id.
    pub bot_user_id: UserId,
    /// Spotify app token. Catalog lookups fail without it.
    pub catalog_token: Option<String>,
    /// Base URL of the chat front-end's gateway API.
    pub chat_gateway_url: Url,
    /// Silence allowed before the bot leaves voice.
    pub inactivity: Duration,
    /// How often each session is checked.
    pub watchdog_poll: Duration,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };
        let url = |key: &str| {
            let raw = required(key)?;
            Url::parse(&raw).map_err(|e| AppError::Config(format!("{key} must be a valid URL: {e}")))
        };
        let number = |key: &str, default: u64| -> Result<u64, AppError> {
            lookup(key).map_or(Ok(default), |raw| {
                raw.parse()
                    .map_err(|e| AppError::Config(format!("{key} must be a number: {e}")))
            })
        };

        let port = u16::try_from(number("PORT", 3000)?)
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let bot_user_id = required("BOT_USER_ID")?
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("BOT_USER_ID must be a user id: {e}")))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            lavalink_url: url("LAVALINK_URL")?,
            lavalink_password: required("LAVALINK_PASSWORD")?,
            bot_user_id: UserId(bot_user_id),
            catalog_token: lookup("CATALOG_TOKEN").filter(|t| !t.is_empty()),
            chat_gateway_url: url("CHAT_GATEWAY_URL")?,
            inactivity: Duration::from_secs(number("INACTIVE_SEC", 60)?),
            watchdog_poll: Duration::from_millis(number("WATCHDOG_POLL_MS", 1000)?),
        })
    }
}
