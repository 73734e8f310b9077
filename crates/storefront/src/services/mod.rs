//! Business logic services for the storefront.
//!
//! Services borrow the [`Store`](crate::db::Store) and any collaborators for
//! the duration of one request; handlers construct them from
//! [`AppState`](crate::state::AppState).
//!
//! # Services
//!
//! - [`auth`] - Signup, login and promotion
//! - [`tokens`] - Session token issuance and verification
//! - [`catalog`] - Book listing and admin mutations
//! - [`orders`] - Order placement and status administration

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderService};
pub use tokens::{TokenError, TokenService, VerifiedToken};
