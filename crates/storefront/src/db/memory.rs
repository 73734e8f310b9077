//! In-memory implementation of the storefront store.
//!
//! All state lives in `BTreeMap`s behind one `tokio::sync::RwLock`, so every
//! mutation is atomic with respect to every other. Nothing survives a restart.
//! Used by tests and by the server when no database URL is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bookstore_core::{
    Book, BookId, Email, NewBook, NewOrder, Order, OrderId, OrderStatus, Role, UserId,
};

use super::{BookStore, OrderStore, RepositoryError, RepositoryResult, Store, UserStore};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, (User, String)>,
    books: BTreeMap<BookId, Book>,
    orders: BTreeMap<OrderId, Order>,
    last_user_id: i32,
    last_book_id: i32,
    last_order_id: i32,
}

/// Advance an id sequence. Fails like an exhausted `SERIAL`.
fn next_id(last: &mut i32) -> RepositoryResult<i32> {
    *last = last
        .checked_add(1)
        .ok_or_else(|| RepositoryError::Conflict("id sequence exhausted".to_owned()))?;
    Ok(*last)
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = UserId::new(next_id(&mut state.last_user_id)?);
        let created = User {
            id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            created_at: Utc::now(),
        };
        state
            .users
            .insert(id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self.get_password_hash(email).await?.map(|(u, _)| u))
    }

    async fn get_password_hash(&self, email: &Email) -> RepositoryResult<Option<(User, String)>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn set_role(&self, id: UserId, role: Role) -> RepositoryResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|(u, _)| {
            u.role = role;
            u.clone()
        }))
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list_books(&self) -> RepositoryResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state.books.values().cloned().collect())
    }

    async fn get_book(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        let state = self.state.read().await;
        Ok(state.books.get(&id).cloned())
    }

    async fn create_book(&self, book: NewBook) -> RepositoryResult<Book> {
        let mut state = self.state.write().await;
        let id = BookId::new(next_id(&mut state.last_book_id)?);
        let book = Book::from_new(id, book);
        state.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete_book(&self, id: BookId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.books.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> RepositoryResult<Order> {
        let mut state = self.state.write().await;
        let id = OrderId::new(next_id(&mut state.last_order_id)?);
        let order = Order::from_new(id, order, Utc::now());
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> RepositoryResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> RepositoryResult<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }

    async fn delete_order(&self, id: OrderId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{BookDraft, CustomerDraft, LineItemDraft, OrderDraft, Price};
    use rust_decimal::Decimal;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            display_name: "Reader".to_owned(),
            password_hash: "hash".to_owned(),
            role: Role::User,
        }
    }

    fn new_order() -> NewOrder {
        OrderDraft {
            customer: CustomerDraft {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: "9876543210".into(),
                address: "1 Lane".into(),
            },
            items: vec![LineItemDraft::new(
                BookId::new(1),
                "Dune",
                1,
                Price::try_new(Decimal::TEN).unwrap(),
            )],
            payment_method: "Credit Card".into(),
            ..OrderDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.co")).await.unwrap();
        let err = store.create_user(new_user("a@b.co")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_role_on_missing_user() {
        let store = MemoryStore::new();
        assert!(store.set_role(UserId::new(9), Role::Admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_books_listed_by_id() {
        let store = MemoryStore::new();
        for title in ["B", "A"] {
            let draft = BookDraft {
                title: Some(title.into()),
                author: Some("X".into()),
                price: Some("1".into()),
                genre: Some("G".into()),
                stock: Some("1".into()),
                image: Some("i.png".into()),
                ..BookDraft::default()
            };
            store.create_book(draft.validate().unwrap()).await.unwrap();
        }
        let titles: Vec<String> = store
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert!(store.delete_book(BookId::new(1)).await.unwrap());
        assert!(!store.delete_book(BookId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_exhausted_sequence_is_an_error() {
        let store = MemoryStore::new();
        store.state.write().await.last_order_id = i32::MAX;

        let err = store.create_order(new_order()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(store.list_orders().await.unwrap().is_empty());
        assert_eq!(store.state.read().await.last_order_id, i32::MAX);
    }

    #[tokio::test]
    async fn test_orders_newest_first() {
        let store = MemoryStore::new();
        let first = store.create_order(new_order()).await.unwrap();
        let second = store.create_order(new_order()).await.unwrap();
        let ids: Vec<OrderId> = store
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(first.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_update_never_inserts() {
        let store = MemoryStore::new();
        let updated = store
            .set_order_status(OrderId::new(42), OrderStatus::Shipped)
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
