//! Order repository for database operations.
//!
//! Orders and their line items live in separate tables. Inserts run in one
//! transaction so an order is never visible without its items.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bookstore_core::{
    BookId, Customer, Email, LineItem, NewOrder, Order, OrderId, OrderStatus, PaymentMethod,
    Price,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    total: Decimal,
    payment_method: PaymentMethod,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email on order {}: {e}", self.id))
        })?;
        let total = Price::try_new(self.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid total on order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            customer: Customer {
                name: self.customer_name,
                email,
                phone: self.customer_phone,
                address: self.customer_address,
            },
            items,
            total,
            payment_method: self.payment_method,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    order_id: i32,
    book_id: i32,
    title: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = RepositoryError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative quantity on order {}", row.order_id))
        })?;
        let price = Price::try_new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price on order {}: {e}", row.order_id))
        })?;

        Ok(Self {
            book_id: BookId::new(row.book_id),
            title: row.title,
            quantity,
            price,
        })
    }
}

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, \
                             customer_address, total, payment_method, status, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its line items atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is persisted then.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (customer_name, customer_email, customer_phone, \
             customer_address, total, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order.customer.name)
        .bind(order.customer.email.as_str())
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(order.total)
        .bind(order.payment_method)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption("too many line items".to_owned())
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} too large", item.quantity))
            })?;

            sqlx::query(
                "INSERT INTO order_items (order_id, position, book_id, title, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(position)
            .bind(item.book_id)
            .bind(&item.title)
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_order(order.items)
    }

    /// List orders newest first with their items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }

    /// Get a single order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        self.with_items(row).await
    }

    /// Overwrite an order's status. Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        self.with_items(row).await
    }

    /// Delete an order; its items cascade. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn with_items(&self, row: Option<OrderRow>) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let lines = self
            .items_for(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        row.into_order(lines).map(Some)
    }

    async fn items_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<LineItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LineItemRow>(
            "SELECT order_id, book_id, title, quantity, price FROM order_items \
             WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<LineItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }
}
