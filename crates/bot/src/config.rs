//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `BOT_HOST` - Bind address (default: 127.0.0.1)
//! - `BOT_PORT` - Listen port (default: 3000)
//! - `TELEGRAM_BOT_TOKEN` - Bot API token for outbound notifications;
//!   notifications are disabled when absent
//! - `ADMIN_CHAT_IDS` - Comma-separated operator chat ids notified on
//!   every committed order
//! - `PICKUP_ADDRESS` - Pickup location shown for self-service orders
//! - `SHOP_CITY` - City written into customer profiles
//! - `ENFORCE_AVAILABILITY` - When `true`, checkout start re-checks
//!   that every cart product is still available (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use chefport_core::ChatId;

const DEFAULT_PICKUP_ADDRESS: &str = "г. Смоленск, ул. Багратиона, д. 2Б";
const DEFAULT_SHOP_CITY: &str = "Смоленск";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bot application configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Telegram Bot API token; `None` disables outbound notifications
    pub bot_token: Option<SecretString>,
    /// Operator chat ids notified about new orders
    pub admin_chat_ids: Vec<ChatId>,
    /// Pickup location substituted as the delivery address for pickup orders
    pub pickup_address: String,
    /// City written into customer profiles on commit
    pub shop_city: String,
    /// Re-check product availability at checkout start
    pub enforce_availability: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BOT_DATABASE_URL")?;
        let host = get_env_or_default("BOT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BOT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOT_PORT".to_string(), e.to_string()))?;

        let bot_token = get_optional_env("TELEGRAM_BOT_TOKEN").map(SecretString::from);
        let admin_chat_ids = match get_optional_env("ADMIN_CHAT_IDS") {
            Some(raw) => parse_admin_ids(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_CHAT_IDS".to_string(), e))?,
            None => Vec::new(),
        };

        let pickup_address = get_env_or_default("PICKUP_ADDRESS", DEFAULT_PICKUP_ADDRESS);
        let shop_city = get_env_or_default("SHOP_CITY", DEFAULT_SHOP_CITY);
        let enforce_availability = get_env_or_default("ENFORCE_AVAILABILITY", "false")
            .parse::<bool>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ENFORCE_AVAILABILITY".to_string(), e.to_string())
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            bot_token,
            admin_chat_ids,
            pickup_address,
            shop_city,
            enforce_availability,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated list of operator chat ids.
fn parse_admin_ids(raw: &str) -> Result<Vec<ChatId>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(ChatId::new)
                .map_err(|e| format!("invalid chat id {part:?}: {e}"))
        })
        .collect()
}
