//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use bookstore_core::{Book, BookDraft, BookId, Message};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::parse_id;
use crate::state::AppState;

/// List the catalog.
///
/// GET /books
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Book>>> {
    Ok(Json(state.catalog().list().await?))
}

/// Add a book.
///
/// POST /books (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    payload: std::result::Result<Json<BookDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>)> {
    let Json(draft) = payload?;
    let book = state.catalog().create(&draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Remove a book.
///
/// DELETE /books/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Message>> {
    let id: BookId = parse_id(&id, "Book")?;
    state.catalog().delete(id).await?;
    Ok(Json(Message::new("Book deleted")))
}
