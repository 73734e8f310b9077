//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` to `STOREFRONT_DATABASE_URL`.
//! The storefront never migrates on startup, so run this after every deploy
//! that ships a new migration.

use super::{CliError, connect};

/// Run storefront database migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
