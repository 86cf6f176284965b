//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::checkout::{CheckoutFlow, CheckoutSettings};
use crate::config::BotConfig;
use crate::notify::TelegramNotifier;
use crate::sessions::SessionStore;
use crate::stores::pg::PgBackend;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BotConfig,
    pool: PgPool,
    flow: CheckoutFlow<PgBackend, TelegramNotifier>,
    sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: BotConfig, pool: PgPool) -> Self {
        let settings = CheckoutSettings::from(&config);
        let notifier = TelegramNotifier::new(config.bot_token.clone());
        let flow = CheckoutFlow::new(PgBackend::new(pool.clone()), notifier, settings);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                flow,
                sessions: SessionStore::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn flow(&self) -> &CheckoutFlow<PgBackend, TelegramNotifier> {
        &self.inner.flow
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
