//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Request ID (add unique ID to each request)
//!
//! Access control is not a layer: handlers opt in with the [`RequireAuth`] and
//! [`RequireAdmin`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{Principal, RequireAdmin, RequireAuth};
pub use request_id::request_id_middleware;
