//! Chefport CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run bot database migrations
//! chefport-cli migrate
//!
//! # Seed the demo catalog
//! chefport-cli seed-demo
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed-demo` - Seed the database with the demo seafood catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chefport-cli")]
#[command(author, version, about = "Chefport CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with the demo seafood catalog
    SeedDemo,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::SeedDemo => commands::seed::run().await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
