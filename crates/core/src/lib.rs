//! Bookstore Core - Shared types library.
//!
//! This crate provides the domain types shared by every bookstore component:
//! - `storefront` - The HTTP API (catalog, accounts, orders)
//! - `client` - Client-side cart, wishlist and API client
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pricing rules - no I/O,
//! no database access, no HTTP clients. Validation lives here so that the
//! client can pre-check a checkout with exactly the rules the server enforces.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, prices, statuses, books, orders and wire DTOs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
