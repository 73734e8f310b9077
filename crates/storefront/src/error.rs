//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every failure leaves as a JSON [`ErrorBody`].

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use bookstore_core::{ErrorBody, ErrorCode, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError, OrderError, TokenError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Request body could not be parsed.
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// Signup with an email that is already registered.
    #[error("Duplicate identity")]
    DuplicateIdentity,

    /// Wrong email or password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or expired session token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status outside the fixed set or rejected by the transition policy.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => ErrorCode::ValidationError,
            Self::DuplicateIdentity => ErrorCode::DuplicateIdentity,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::Unauthenticated(_) => ErrorCode::Unauthenticated,
            Self::Forbidden => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidStatus(_) => ErrorCode::InvalidStatus,
            Self::Database(_) | Self::Internal(_) => ErrorCode::ServerError,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::ValidationError
            | ErrorCode::DuplicateIdentity
            | ErrorCode::InvalidCredentials
            | ErrorCode::InvalidStatus => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => ErrorBody::validation(errors),
            Self::MalformedBody(detail) => ErrorBody::new(ErrorCode::ValidationError, detail),
            Self::DuplicateIdentity => ErrorBody::new(
                ErrorCode::DuplicateIdentity,
                "An account with this email already exists",
            ),
            Self::InvalidCredentials => {
                ErrorBody::new(ErrorCode::InvalidCredentials, "Invalid email or password")
            }
            Self::Unauthenticated(reason) => ErrorBody::new(ErrorCode::Unauthenticated, reason),
            Self::Forbidden => ErrorBody::new(ErrorCode::Forbidden, "Admin access required"),
            Self::NotFound(what) => ErrorBody::new(ErrorCode::NotFound, format!("{what} not found")),
            Self::InvalidStatus(detail) => ErrorBody::new(ErrorCode::InvalidStatus, detail),
            Self::Database(_) | Self::Internal(_) => {
                ErrorBody::new(ErrorCode::ServerError, "Internal server error")
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::UserAlreadyExists => Self::DuplicateIdentity,
            AuthError::UserNotFound => Self::NotFound("User".to_owned()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => Self::Validation(errors),
            CatalogError::NotFound(_) => Self::NotFound("Book".to_owned()),
            CatalogError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(errors) => Self::Validation(errors),
            OrderError::NotFound(_) => Self::NotFound("Order".to_owned()),
            OrderError::InvalidStatus(detail) => Self::InvalidStatus(detail),
            OrderError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_of(err: AppError) -> ErrorBody {
        let bytes = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation(ValidationErrors::single("title", "is required"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::DuplicateIdentity), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::InvalidCredentials), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::InvalidStatus("Lost".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("missing token")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::NotFound("Book".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "is required");
        errors.push("price", "must be a number");

        let body = body_of(AppError::Validation(errors)).await;
        assert_eq!(body.code, ErrorCode::ValidationError);
        assert_eq!(body.fields.len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "orders.total is negative".to_owned(),
        ));
        let body = body_of(err).await;
        assert_eq!(body.code, ErrorCode::ServerError);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_service_errors_map_to_codes() {
        assert_eq!(
            AppError::from(AuthError::UserAlreadyExists).code(),
            ErrorCode::DuplicateIdentity
        );
        assert_eq!(
            AppError::from(AuthError::UserNotFound).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            AppError::from(OrderError::InvalidStatus("Lost".to_owned())).code(),
            ErrorCode::InvalidStatus
        );
        assert_eq!(
            AppError::from(CatalogError::NotFound(bookstore_core::BookId::new(1))).code(),
            ErrorCode::NotFound
        );
    }
}
