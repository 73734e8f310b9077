//! Catalog seeding.
//!
//! Reads a JSON array of book objects (same shape as `POST /books`) and adds
//! them all. The whole file is validated first; if any entry is invalid,
//! each bad entry is reported by index and nothing is inserted.

use std::path::Path;

use bookstore_core::BookDraft;
use bookstore_storefront::services::CatalogService;
use tracing::{error, info};

use super::{CliError, store};

/// Parse a seed file's contents.
fn parse_books(content: &str) -> Result<Vec<BookDraft>, CliError> {
    Ok(serde_json::from_str(content)?)
}

/// Seed books from a JSON file.
pub async fn books(path: &Path) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
    let drafts = parse_books(&content)?;
    info!(path = %path.display(), books = drafts.len(), "Parsed seed file");

    // Validate everything before connecting so a bad file touches nothing
    let rejected: Vec<(usize, String)> = drafts
        .iter()
        .enumerate()
        .filter_map(|(i, draft)| draft.validate().err().map(|e| (i, e.to_string())))
        .collect();
    if !rejected.is_empty() {
        error!("Seed file validation failed:");
        for (i, err) in &rejected {
            error!("  - book #{i}: {err}");
        }
        return Err(CliError::Rejected(rejected.len()));
    }

    let store = store().await?;
    let catalog = CatalogService::new(&store);

    for draft in &drafts {
        let book = catalog.create(draft).await?;
        info!(book_id = %book.id, title = %book.title, "Inserted");
    }

    info!("Seeding complete!");
    info!("  Books inserted: {}", drafts.len());
    Ok(())
}
