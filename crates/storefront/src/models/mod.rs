//! Domain models for storefront.
//!
//! Books and orders are shared with the client and live in `bookstore-core`.
//! Only account types, which carry server-side credential data, live here.

pub mod user;

pub use user::{NewUser, User};
