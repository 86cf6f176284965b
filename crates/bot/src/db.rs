//! Database pool and embedded migrations.
//!
//! ## Tables
//!
//! - `products` - Catalog the cart joins against
//! - `cart_lines` - One row per (user, product)
//! - `user_profiles` - Saved contact details, one per user
//! - `user_addresses` - Saved delivery addresses
//! - `orders` / `order_items` / `order_history` - The order aggregate
//!
//! Migrations live in `crates/bot/migrations/` and run via:
//! ```bash
//! cargo run -p chefport-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Migrations embedded at build time from `crates/bot/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
