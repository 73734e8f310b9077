//! Access control extractors.
//!
//! A request authenticates with a session token in the `x-auth-token` header.
//! The token only names the caller: the user is re-read from the store on
//! every request and the stored role is authoritative, so a demotion or a
//! deleted account takes effect before the token expires.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use bookstore_core::AUTH_HEADER;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::TokenError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }
}

/// Extractor that requires a valid session.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(principal): RequireAuth) -> Json<UserProfile> {
///     Json(principal.user.profile())
/// }
/// ```
pub struct RequireAuth(pub Principal);

/// Extractor that requires a valid session belonging to an admin.
pub struct RequireAdmin(pub Principal);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        authenticate(parts, &state).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let principal = authenticate(parts, &state).await?;
        authorize_admin(principal, parts.uri.path()).map(Self)
    }
}

/// Resolve the caller from the session token header.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Principal, AppError> {
    let path = parts.uri.path();

    let Some(token) = parts
        .headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        tracing::warn!(path, "missing session token");
        return Err(AppError::Unauthenticated("missing session token"));
    };

    let verified = state.tokens().verify(token).map_err(|e| {
        tracing::warn!(path, error = %e, "rejected session token");
        match e {
            TokenError::Expired => AppError::Unauthenticated("session expired"),
            TokenError::Invalid(_) | TokenError::Generation(_) => {
                AppError::Unauthenticated("invalid session token")
            }
        }
    })?;

    let Some(user) = state.store().get_user(verified.user_id).await? else {
        tracing::warn!(path, user_id = %verified.user_id, "token for unknown user");
        return Err(AppError::Unauthenticated("unknown user"));
    };

    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(Principal { user })
}

/// Admit admins only.
fn authorize_admin(principal: Principal, path: &str) -> Result<Principal, AppError> {
    if principal.is_admin() {
        Ok(principal)
    } else {
        tracing::warn!(path, user_id = %principal.user.id, "forbidden: admin required");
        Err(AppError::Forbidden)
    }
}
