//! Database migration command.
//!
//! Runs the migrations embedded in the bot crate
//! (`crates/bot/migrations/`) against the bot database.

use super::CommandError;

pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running bot database migrations...");
    chefport_bot::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
