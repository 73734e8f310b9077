//! Order route handlers.
//!
//! Placement is public; everything else is for admins.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use bookstore_core::{Message, Order, OrderDraft, OrderId, StatusUpdate};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::parse_id;
use crate::state::AppState;

/// Place an order from a cart snapshot.
///
/// POST /orders
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OrderDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(draft) = payload?;
    let order = state.orders().place(&draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// All orders, newest first.
///
/// GET /orders (admin)
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list().await?))
}

/// Change an order's status.
///
/// PATCH /orders/{id}/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    payload: std::result::Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let Json(update) = payload?;
    let order = state.orders().update_status(id, &update.status).await?;
    Ok(Json(order))
}

/// Remove an order.
///
/// DELETE /orders/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Message>> {
    let id: OrderId = parse_id(&id, "Order")?;
    state.orders().delete(id).await?;
    Ok(Json(Message::new("Order deleted")))
}
