//! Authentication service.
//!
//! Password accounts with Argon2id hashes, session issuance, and promotion.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use bookstore_core::{Email, Role, UserId, ValidationErrors};

use crate::db::{RepositoryError, Store};
use crate::models::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified when the login email is unknown, so both failure paths cost
/// the same.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-account-password").ok());

/// Authentication service.
///
/// Handles registration, login and promotion. Sessions for the returned
/// users are issued by [`TokenService::session`](crate::services::TokenService::session).
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new user with role `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every bad field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        self.register_with_role(email, display_name, password, Role::User)
            .await
    }

    /// Register a user with an explicit role. Used for admin bootstrap.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    pub async fn register_with_role(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let mut errors = ValidationErrors::new();

        let email = match Email::parse(email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        };

        let display_name = display_name.trim();
        if display_name.is_empty() {
            errors.push("displayName", "is required");
        }

        if let Err(message) = validate_password(password) {
            errors.push("password", message);
        }

        let email = match email {
            Some(email) if errors.is_empty() => email,
            _ => return Err(AuthError::Validation(errors)),
        };

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(NewUser {
                email,
                display_name: display_name.to_owned(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords fail identically.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let record = match Email::parse(email) {
            Ok(email) => self.store.get_password_hash(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = record else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            tracing::warn!("login failed");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password, &password_hash) {
            tracing::warn!(user_id = %user.id, "login failed");
            return Err(e);
        }

        Ok(user)
    }

    /// Grant the admin role. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    #[instrument(skip(self))]
    pub async fn promote(&self, user_id: UserId) -> Result<User, AuthError> {
        let user = self
            .store
            .set_role(user_id, Role::Admin)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "user promoted to admin");
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register("Reader@Example.com", "Reader", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email.as_str(), "reader@example.com");

        let logged_in = auth.login("reader@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register("a@b.co", "A", "hunter22").await.unwrap();
        let err = auth.register("A@B.co", "B", "hunter22").await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_reports_every_field() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth.register("nope", " ", "123").await.unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("email"));
        assert!(errors.contains("displayName"));
        assert!(errors.contains("password"));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_alike() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.register("a@b.co", "A", "hunter22").await.unwrap();

        let missing = auth.login("z@b.co", "hunter22").await.unwrap_err();
        let wrong = auth.login("a@b.co", "hunter23").await.unwrap_err();
        assert_eq!(missing.to_string(), wrong.to_string());
        assert!(matches!(missing, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_promote_is_idempotent() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = auth.register("a@b.co", "A", "hunter22").await.unwrap();

        assert_eq!(auth.promote(user.id).await.unwrap().role, Role::Admin);
        assert_eq!(auth.promote(user.id).await.unwrap().role, Role::Admin);
        assert!(matches!(
            auth.promote(UserId::new(999)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
