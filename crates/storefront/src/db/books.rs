//! Book repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use bookstore_core::{Book, BookId, NewBook, Price};

use super::RepositoryError;

/// Internal row type for `PostgreSQL` book queries.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i32,
    title: String,
    author: String,
    price: Decimal,
    genre: String,
    rating: Option<f64>,
    stock: i32,
    description: Option<String>,
    image: String,
}

impl TryFrom<BookRow> for Book {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let price = Price::try_new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for book {}: {e}", row.id))
        })?;
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative stock for book {}", row.id))
        })?;

        Ok(Self {
            id: BookId::new(row.id),
            title: row.title,
            author: row.author,
            price,
            genre: row.genre,
            rating: row.rating,
            stock,
            description: row.description,
            image: row.image,
        })
    }
}

const BOOK_COLUMNS: &str = "id, title, author, price, genre, rating, stock, description, image";

/// Repository for catalog database operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every book ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a book by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a validated book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        let stock = i32::try_from(book.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("stock {} exceeds column range", book.stock))
        })?;

        let row = sqlx::query_as::<_, BookRow>(&format!(
            "INSERT INTO books (title, author, price, genre, rating, stock, description, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price)
        .bind(&book.genre)
        .bind(book.rating)
        .bind(stock)
        .bind(&book.description)
        .bind(&book.image)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Delete a book. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
