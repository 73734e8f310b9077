//! Catalog management.

use thiserror::Error;
use tracing::instrument;

use bookstore_core::{Book, BookDraft, BookId, ValidationErrors};

use crate::db::{RepositoryError, Store};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid book: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Lists, creates and deletes catalog books.
pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// All books, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.store.list_books().await?)
    }

    /// Validate a draft and add it to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` naming every rejected field.
    #[instrument(skip_all)]
    pub async fn create(&self, draft: &BookDraft) -> Result<Book, CatalogError> {
        let book = draft.validate()?;
        let book = self.store.create_book(book).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Remove a book. Orders that reference it keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no such book exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: BookId) -> Result<(), CatalogError> {
        if !self.store.delete_book(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{NumericInput, Price};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::MemoryStore;

    fn draft() -> BookDraft {
        BookDraft {
            title: Some("Dune".to_owned()),
            author: Some("Frank Herbert".to_owned()),
            price: Some(NumericInput::from("19.99")),
            genre: Some("Sci-Fi".to_owned()),
            rating: Some(NumericInput::from("4.5")),
            stock: Some(NumericInput::from("3")),
            description: None,
            image: Some("https://img.example/dune.jpg".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_coerces_numerics() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);

        let created = catalog.create(&draft()).await.unwrap();
        let books = catalog.list().await.unwrap();

        assert_eq!(books, vec![created.clone()]);
        assert_eq!(
            created.price,
            Price::try_new(Decimal::new(1999, 2)).unwrap()
        );
        assert_eq!(created.stock, 3);
        assert_eq!(created.rating, Some(4.5));
    }

    #[tokio::test]
    async fn test_rating_out_of_range_is_rejected() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);

        for rating in ["5.5", "-1"] {
            let mut bad = draft();
            bad.rating = Some(NumericInput::from(rating));
            let err = catalog.create(&bad).await.unwrap_err();
            let CatalogError::Validation(errors) = err else {
                panic!("expected validation error, got {err:?}");
            };
            assert!(errors.contains("rating"));
        }
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);

        let book = catalog.create(&draft()).await.unwrap();
        catalog.delete(book.id).await.unwrap();
        assert!(matches!(
            catalog.delete(book.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
