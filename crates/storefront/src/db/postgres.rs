//! `PostgreSQL` implementation of the storefront store.

use async_trait::async_trait;
use sqlx::PgPool;

use bookstore_core::{
    Book, BookId, Email, NewBook, NewOrder, Order, OrderId, OrderStatus, Role, UserId,
};

use super::books::BookRepository;
use super::orders::OrderRepository;
use super::users::UserRepository;
use super::{BookStore, OrderStore, RepositoryResult, Store, UserStore};
use crate::models::{NewUser, User};

/// Durable store backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        UserRepository::new(&self.pool).create(&user).await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        UserRepository::new(&self.pool).get_by_email(email).await
    }

    async fn get_password_hash(&self, email: &Email) -> RepositoryResult<Option<(User, String)>> {
        UserRepository::new(&self.pool).get_password_hash(email).await
    }

    async fn set_role(&self, id: UserId, role: Role) -> RepositoryResult<Option<User>> {
        UserRepository::new(&self.pool).set_role(id, role).await
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn list_books(&self) -> RepositoryResult<Vec<Book>> {
        BookRepository::new(&self.pool).list().await
    }

    async fn get_book(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        BookRepository::new(&self.pool).get(id).await
    }

    async fn create_book(&self, book: NewBook) -> RepositoryResult<Book> {
        BookRepository::new(&self.pool).create(&book).await
    }

    async fn delete_book(&self, id: BookId) -> RepositoryResult<bool> {
        BookRepository::new(&self.pool).delete(id).await
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: NewOrder) -> RepositoryResult<Order> {
        OrderRepository::new(&self.pool).create(order).await
    }

    async fn list_orders(&self) -> RepositoryResult<Vec<Order>> {
        OrderRepository::new(&self.pool).list().await
    }

    async fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        OrderRepository::new(&self.pool).get(id).await
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> RepositoryResult<Option<Order>> {
        OrderRepository::new(&self.pool).set_status(id, status).await
    }

    async fn delete_order(&self, id: OrderId) -> RepositoryResult<bool> {
        OrderRepository::new(&self.pool).delete(id).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
