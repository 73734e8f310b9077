//! Admin account management commands.
//!
//! Promotion over HTTP requires an existing admin, so the first one is
//! created here.

use bookstore_core::{Email, Role, UserId};
use bookstore_storefront::db::UserStore;
use bookstore_storefront::services::AuthService;

use super::{CliError, store};

/// Create a new account with the admin role.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, CliError> {
    let store = store().await?;

    tracing::info!("Creating admin user: {}", email);
    let user = AuthService::new(&store)
        .register_with_role(email, name, password, Role::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Grant the admin role to the account with this email. Idempotent.
pub async fn promote(email: &str) -> Result<UserId, CliError> {
    let parsed = Email::parse(email).map_err(|_| CliError::UnknownEmail(email.to_owned()))?;
    let store = store().await?;

    let user = store
        .get_user_by_email(&parsed)
        .await?
        .ok_or_else(|| CliError::UnknownEmail(email.to_owned()))?;

    if user.role.is_admin() {
        tracing::info!("{} is already an admin", user.email);
        return Ok(user.id);
    }

    let user = AuthService::new(&store).promote(user.id).await?;
    tracing::info!("Promoted {} (ID: {}) to admin", user.email, user.id);
    Ok(user.id)
}
