//! User account handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::User;
use crate::services::{AuthService, ProfileInput, Registration, UserService};
use crate::state::AppState;

/// Account creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub role: String,
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub surname: String,
    pub address: String,
    pub birthdate: String,
}

/// Create an account. Open to everyone.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .register(Registration {
            username: &body.username,
            name: &body.name,
            surname: &body.surname,
            password: &body.password,
            role: &body.role,
        })
        .await?;
    Ok(StatusCode::OK)
}

pub async fn list(State(state): State<AppState>, _admin: RequireAdmin) -> Result<Json<Vec<User>>> {
    Ok(Json(UserService::new(state.pool()).list().await?))
}

pub async fn list_by_role(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(role): Path<String>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserService::new(state.pool()).list_by_role(&role).await?))
}

pub async fn get(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(username): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(UserService::new(state.pool()).get(&actor, &username).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    UserService::new(state.pool()).delete(&actor, &username).await?;
    Ok(StatusCode::OK)
}

/// Delete every non-admin account.
pub async fn delete_all(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<StatusCode> {
    UserService::new(state.pool()).delete_all_non_admins().await?;
    Ok(StatusCode::OK)
}

/// Update a profile and return the updated user.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(username): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    let updated = UserService::new(state.pool())
        .update(
            &actor,
            &username,
            ProfileInput {
                name: &body.name,
                surname: &body.surname,
                address: &body.address,
                birthdate: &body.birthdate,
            },
        )
        .await?;
    Ok(Json(updated))
}
