//! Core types for the bookstore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod api;
pub mod book;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod status;
pub mod validation;

pub use api::{
    AUTH_HEADER, AuthResponse, ErrorBody, ErrorCode, LoginRequest, Message, SignupRequest,
    StatusUpdate, UserProfile,
};
pub use book::{Book, BookDraft, NewBook};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{
    Customer, CustomerDraft, LineItem, LineItemDraft, NewOrder, Order, OrderDraft, PaymentMethod,
    order_total,
};
pub use price::{Price, PriceError};
pub use status::{OrderStatus, Role, TransitionPolicy, UnknownVariant};
pub use validation::{FieldError, NumericInput, ValidationErrors};
