//! Admin notification sink.
//!
//! Order notifications are best-effort: the checkout flow logs a failed
//! delivery and carries on, a committed order is never rolled back
//! because a notification bounced.

use std::time::Duration;

use secrecy::{ExposeSecret as _, SecretString};
use serde_json::json;
use thiserror::Error;

use chefport_core::ChatId;

/// A hung Bot API call must not stall a dialog turn.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP call to the messaging API failed.
    #[error("notification delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging API rejected the request.
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Something that can deliver a text message to a chat.
pub trait NotifySink {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), NotifyError>;
}

/// Delivers messages through the Telegram Bot API.
///
/// Without a configured token every send becomes a logged no-op, which
/// keeps local development working without credentials.
#[derive(Clone)]
pub struct TelegramNotifier {
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(token: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { token, client }
    }
}

impl NotifySink for TelegramNotifier {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), NotifyError> {
        let Some(token) = &self.token else {
            tracing::debug!(chat = %chat, "bot token not configured, dropping notification");
            return Ok(());
        };

        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            token.expose_secret()
        );
        self.client
            .post(url)
            .json(&json!({ "chat_id": chat.as_i64(), "text": text }))
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(chat = %chat, "notification delivered");
        Ok(())
    }
}
