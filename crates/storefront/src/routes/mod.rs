//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness
//! GET    /health/ready           - Readiness (store reachable)
//!
//! # Catalog
//! GET    /books                  - List books
//! POST   /books                  - Add a book (admin)
//! DELETE /books/{id}             - Remove a book (admin)
//!
//! # Accounts
//! POST   /user/signup            - Create account, returns {token, user}
//! POST   /user/login             - Login, returns {token, user}
//! PUT    /user/promote/{id}      - Grant admin (admin)
//! GET    /user/me                - Current user (authenticated)
//!
//! # Orders
//! POST   /orders                 - Place an order
//! GET    /orders                 - List orders, newest first (admin)
//! DELETE /orders/{id}            - Remove an order (admin)
//! PATCH  /orders/{id}/status     - Change status (admin)
//! ```

pub mod books;
pub mod health;
pub mod orders;
pub mod users;

use std::str::FromStr;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::index).post(books::create))
        .route("/{id}", delete(books::delete))
}

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/promote/{id}", put(users::promote))
        .route("/me", get(users::me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", delete(orders::delete))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/books", book_routes())
        .nest("/user", user_routes())
        .nest("/orders", order_routes())
}

/// Parse a path id. Anything that is not an id cannot name an existing
/// record, so it is reported as not found.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| AppError::NotFound(what.to_owned()))
}
