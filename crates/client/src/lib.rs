//! Bookstore client library.
//!
//! Everything a storefront UI keeps on the user's side of the wire:
//!
//! - [`cart`] - The cart aggregate and its pricing
//! - [`wishlist`] - Saved-for-later books
//! - [`storage`] - Durable local key/value documents (file or memory)
//! - [`session`] - [`ClientSession`]: auth, cart and wishlist, persisted
//! - [`api`] - [`ApiClient`] for the storefront HTTP API
//!
//! The server never sees a cart until checkout, when it arrives as an order
//! snapshot. Checkout clears the cart only after the server acknowledges the
//! order.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod error;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use api::ApiClient;
pub use cart::{Cart, CartItem, CartState};
pub use error::ClientError;
pub use session::{CheckoutDetails, ClientSession};
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use wishlist::Wishlist;
