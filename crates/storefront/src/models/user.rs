//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use bookstore_core::{Email, Role, UserId, UserProfile};

/// A bookstore account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address, unique across accounts.
    pub email: Email,
    /// Name shown in the UI.
    pub display_name: String,
    /// Authorization role.
    pub role: Role,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.id, self.display_name.clone(), self.email.clone(), self.role)
    }
}

/// Data needed to insert a user. The hash is already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
}
