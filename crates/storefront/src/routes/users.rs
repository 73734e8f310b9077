//! Account route handlers: signup, login, promotion and the current user.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use bookstore_core::{AuthResponse, LoginRequest, SignupRequest, UserId, UserProfile};

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::routes::parse_id;
use crate::state::AppState;

/// Create an account and start a session.
///
/// POST /user/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    let user = state
        .auth()
        .register(&req.email, &req.display_name, &req.password)
        .await?;
    let session = state.tokens().session(&user)?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Exchange credentials for a session.
///
/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = payload?;
    let user = state.auth().login(&req.email, &req.password).await?;
    Ok(Json(state.tokens().session(&user)?))
}

/// Grant the admin role.
///
/// PUT /user/promote/{id} (admin)
pub async fn promote(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    let id: UserId = parse_id(&id, "User")?;
    let user = state.auth().promote(id).await?;
    tracing::info!(promoted_by = %admin.user.id, user_id = %user.id, "admin granted");
    Ok(Json(user.profile()))
}

/// The caller's own profile.
///
/// GET /user/me
pub async fn me(RequireAuth(principal): RequireAuth) -> Json<UserProfile> {
    Json(principal.user.profile())
}
