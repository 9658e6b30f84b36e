//! Login, logout and current-session handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::User;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Log in with username and password.
///
/// Rejected when the session already belongs to a user.
pub async fn login(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<User>> {
    if let Some(current) = current {
        tracing::warn!(username = %current.username, "login attempt while logged in");
        return Err(AuthError::AlreadyLoggedIn.into());
    }

    let user = AuthService::new(state.pool())
        .login(&body.username, &body.password)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::warn!(username = %body.username, "login rejected");
            }
        })?;

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.username);

    tracing::info!(username = %user.username, role = %user.role, "user logged in");
    Ok(Json(user))
}

/// Log out and destroy the session.
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    tracing::info!(username = %user.username, "user logged out");
    Ok(StatusCode::OK)
}

/// The logged-in user.
pub async fn current(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
