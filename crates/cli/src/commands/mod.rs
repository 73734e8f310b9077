//! Command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use bookstore_storefront::db::{self, RepositoryError, postgres::PgStore};
use bookstore_storefront::services::{AuthError, CatalogError};
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors surfaced by any command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No account with this email.
    #[error("No account with email: {0}")]
    UnknownEmail(String),

    /// Seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not a JSON array of books.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Some seed entries were rejected.
    #[error("{0} book(s) were rejected")]
    Rejected(usize),
}

/// Database URL from the environment, loading `.env` first.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Connect to the storefront database.
async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&url).await?)
}

/// Store over the storefront database.
async fn store() -> Result<PgStore, CliError> {
    Ok(PgStore::new(connect().await?))
}
