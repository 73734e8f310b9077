//! Request and response bodies shared by the server and the client.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::status::Role;
use super::validation::{FieldError, ValidationErrors};

/// Header carrying the bearer session token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// `POST /user/signup` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    #[serde(alias = "fullname", alias = "name")]
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// `POST /user/login` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account. Never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: Email,
    pub role: Role,
    pub is_admin: bool,
}

impl UserProfile {
    /// Build a profile; `is_admin` follows the role.
    #[must_use]
    pub const fn new(id: UserId, display_name: String, email: Email, role: Role) -> Self {
        Self {
            id,
            display_name,
            email,
            role,
            is_admin: role.is_admin(),
        }
    }
}

/// Signup and login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// `PATCH /orders/{id}/status` body. Kept as text so unknown names map to
/// `InvalidStatus` rather than a body parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Plain acknowledgment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    /// Create a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    ValidationError,
    DuplicateIdentity,
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound,
    InvalidStatus,
    ServerError,
}

impl ErrorCode {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::DuplicateIdentity => "DuplicateIdentity",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::Unauthenticated => "Unauthenticated",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::InvalidStatus => "InvalidStatus",
            Self::ServerError => "ServerError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorBody {
    /// An error body without field details.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// A `ValidationError` body listing every rejected field.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: errors.to_string(),
            fields: errors.into_fields(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_accepts_fullname_alias() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"fullname":"Ada","email":"a@b.co","password":"secret"}"#)
                .unwrap();
        assert_eq!(req.display_name, "Ada");
    }

    #[test]
    fn test_profile_is_admin_follows_role() {
        let email = Email::parse("a@b.co").unwrap();
        let profile = UserProfile::new(UserId::new(1), "Ada".into(), email, Role::Admin);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["isAdmin"], serde_json::json!(true));
        assert_eq!(value["displayName"], serde_json::json!("Ada"));
    }

    #[test]
    fn test_error_body_omits_empty_fields() {
        let body = ErrorBody::new(ErrorCode::NotFound, "order not found");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["code"], serde_json::json!("NotFound"));
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let body = ErrorBody::validation(ValidationErrors::single("price", "is required"));
        assert_eq!(body.fields.len(), 1);
        assert_eq!(body.message, "price: is required");
    }
}
