//! Authentication extractors.
//!
//! The session only stores a [`CurrentUser`]. Every authenticated request
//! reloads the user from the database, so a deleted account or a changed
//! profile takes effect immediately.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::Span;

use ezelectronics_core::Role;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> Json<User> {
///     Json(user)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that requires a logged-in `Admin`.
pub struct RequireAdmin(pub User);

/// Extractor that requires a logged-in `Manager` or `Admin`.
pub struct RequireStaff(pub User);

/// Extractor that requires a logged-in `Customer`.
pub struct RequireCustomer(pub User);

/// Extractor that reads the session identity without touching the database.
///
/// Does not reject when nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

fn session_from(parts: &Parts) -> Result<&Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
}

/// Load the logged-in user, rejecting with 401 when there is none.
async fn authenticated_user(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let session = session_from(parts)?;

    let current: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await?
        .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?;

    let Some(user) = UserRepository::new(state.pool())
        .get(&current.username)
        .await?
    else {
        // The account was deleted while the session was alive.
        session.flush().await?;
        return Err(AppError::Unauthorized("not logged in".to_string()));
    };

    Span::current().record("username", user.username.as_str());
    Ok(user)
}

fn require_role(user: User, allowed: impl Fn(Role) -> bool, what: &str) -> Result<User, AppError> {
    if allowed(user.role) {
        Ok(user)
    } else {
        Err(AppError::Unauthorized(format!("user is not {what}")))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticated_user(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts, state).await?;
        require_role(user, |r| r == Role::Admin, "an admin").map(Self)
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts, state).await?;
        require_role(user, |r| r.is_staff(), "a manager or an admin").map(Self)
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts, state).await?;
        require_role(user, |r| r == Role::Customer, "a customer").map(Self)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(current))
    }
}

/// Helper to set the current user in the session (login).
///
/// Cycles the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(
            session_keys::CURRENT_USER,
            CurrentUser {
                username: user.username.clone(),
                role: user.role,
            },
        )
        .await
}

/// Helper to destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ezelectronics_core::Username;

    fn user(role: Role) -> User {
        User {
            username: Username::parse("mario").unwrap(),
            name: "Mario".to_string(),
            surname: "Rossi".to_string(),
            role,
            address: None,
            birthdate: None,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(user(Role::Admin), |r| r.is_staff(), "staff").is_ok());
        assert!(require_role(user(Role::Manager), |r| r.is_staff(), "staff").is_ok());
        assert!(matches!(
            require_role(user(Role::Customer), |r| r.is_staff(), "staff"),
            Err(AppError::Unauthorized(msg)) if msg == "user is not staff"
        ));
        assert!(require_role(user(Role::Admin), |r| r == Role::Customer, "a customer").is_err());
    }
}
