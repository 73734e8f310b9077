//! Order placement and administration.

use thiserror::Error;
use tracing::instrument;

use bookstore_core::{Order, OrderDraft, OrderId, OrderStatus, TransitionPolicy, ValidationErrors};

use crate::db::{RepositoryError, Store};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Places orders and applies admin status changes.
///
/// Placement does not reserve stock: concurrent orders for the last copy of
/// a book all succeed.
pub struct OrderService<'a> {
    store: &'a dyn Store,
    policy: TransitionPolicy,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Validate a checkout and persist it as `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty cart, a bad customer
    /// block, a bad payment method or a total that does not match the items.
    #[instrument(skip_all, fields(items = draft.items.len()))]
    pub async fn place(&self, draft: &OrderDraft) -> Result<Order, OrderError> {
        let order = draft.validate()?;
        let order = self.store.create_order(order).await?;
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");
        Ok(order)
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders().await?)
    }

    /// Overwrite an order's status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStatus` if `status` is not a known status
    /// or the configured policy rejects the transition, and
    /// `OrderError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, OrderError> {
        let next: OrderStatus = status
            .parse()
            .map_err(|_| OrderError::InvalidStatus(status.to_owned()))?;

        let current = self
            .store
            .get_order(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        if !self.policy.permits(current.status, next) {
            tracing::warn!(order_id = %id, from = %current.status, to = %next, "transition rejected");
            return Err(OrderError::InvalidStatus(format!(
                "cannot move from {} to {next}",
                current.status
            )));
        }

        // The order may vanish between the read and the write
        let order = self
            .store
            .set_order_status(id, next)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        tracing::info!(order_id = %id, status = %next, "order status updated");
        Ok(order)
    }

    /// Hard-delete an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no such order exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<(), OrderError> {
        if !self.store.delete_order(id).await? {
            return Err(OrderError::NotFound(id));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{BookId, CustomerDraft, LineItemDraft, Price};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::MemoryStore;

    fn checkout() -> OrderDraft {
        OrderDraft {
            customer: CustomerDraft {
                name: "Asha".to_owned(),
                email: "asha@example.com".to_owned(),
                phone: "9876543210".to_owned(),
                address: "12 MG Road".to_owned(),
            },
            items: vec![
                LineItemDraft::new(BookId::new(1), "Dune", 2, Price::try_new(Decimal::from(100)).unwrap()),
                LineItemDraft::new(BookId::new(2), "Emma", 1, Price::try_new(Decimal::from(50)).unwrap()),
            ],
            payment_method: "Cash on Delivery".to_owned(),
            upi_id: None,
            total: None,
        }
    }

    #[tokio::test]
    async fn test_place_derives_total() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);

        let order = orders.place(&checkout()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.amount(), Decimal::from(250));
    }

    #[tokio::test]
    async fn test_empty_cart_persists_nothing() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);

        let mut draft = checkout();
        draft.items.clear();
        assert!(matches!(
            orders.place(&draft).await,
            Err(OrderError::Validation(_))
        ));
        assert!(orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_order_creates_nothing() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);

        let err = orders
            .update_status(OrderId::new(41), "Shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
        assert!(orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);
        let order = orders.place(&checkout()).await.unwrap();

        let err = orders.update_status(order.id, "Lost").await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn test_permissive_policy_allows_any_move() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);
        let order = orders.place(&checkout()).await.unwrap();

        orders.update_status(order.id, "Delivered").await.unwrap();
        let reopened = orders.update_status(order.id, "Pending").await.unwrap();
        assert_eq!(reopened.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_strict_policy_enforces_lifecycle() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Strict);
        let order = orders.place(&checkout()).await.unwrap();

        orders.update_status(order.id, "Shipped").await.unwrap();
        orders.update_status(order.id, "Delivered").await.unwrap();
        let err = orders.update_status(order.id, "Cancelled").await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidStatus(_)));

        // Re-applying the current status is always fine
        orders.update_status(order.id, "Delivered").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store, TransitionPolicy::Permissive);
        let order = orders.place(&checkout()).await.unwrap();

        orders.delete(order.id).await.unwrap();
        assert!(matches!(
            orders.delete(order.id).await,
            Err(OrderError::NotFound(_))
        ));
    }
}
