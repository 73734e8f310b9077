//! Persistence for accounts, catalog and orders.
//!
//! # Backends
//!
//! - [`memory::MemoryStore`] - process-local maps, used for tests and when no
//!   database URL is configured
//! - [`postgres::PgStore`] - `PostgreSQL` via the repositories in [`users`],
//!   [`books`] and [`orders`]
//!
//! Handlers and services only see the [`Store`] trait.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p bookstore-cli -- migrate
//! ```

pub mod books;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bookstore_core::{
    Book, BookId, Email, NewBook, NewOrder, Order, OrderId, OrderStatus, Role, UserId,
};

use crate::models::{NewUser, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Shorthand for repository results.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;
    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
    /// The user together with their stored password hash.
    async fn get_password_hash(&self, email: &Email) -> RepositoryResult<Option<(User, String)>>;
    /// Overwrite the role. `None` if the user does not exist.
    async fn set_role(&self, id: UserId, role: Role) -> RepositoryResult<Option<User>>;
}

/// Catalog persistence.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by id.
    async fn list_books(&self) -> RepositoryResult<Vec<Book>>;
    async fn get_book(&self, id: BookId) -> RepositoryResult<Option<Book>>;
    async fn create_book(&self, book: NewBook) -> RepositoryResult<Book>;
    /// Returns `false` if no such book existed.
    async fn delete_book(&self, id: BookId) -> RepositoryResult<bool>;
}

/// Order persistence. An order and its line items are written atomically.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a validated order with status `Pending`.
    async fn create_order(&self, order: NewOrder) -> RepositoryResult<Order>;
    /// All orders, newest first (ties broken by id, descending).
    async fn list_orders(&self) -> RepositoryResult<Vec<Order>>;
    async fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>>;
    /// Overwrite the status. `None` if the order does not exist; never inserts.
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> RepositoryResult<Option<Order>>;
    /// Returns `false` if no such order existed.
    async fn delete_order(&self, id: OrderId) -> RepositoryResult<bool>;
}

/// Every store the storefront needs, behind one object.
#[async_trait]
pub trait Store: UserStore + BookStore + OrderStore {
    /// Check that the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<()>;
    /// Returns true if data survives a restart.
    fn is_durable(&self) -> bool;
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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

/// Map a unique-violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
