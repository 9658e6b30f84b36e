//! Product review handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, RequireCustomer, RequireStaff};
use crate::models::Review;
use crate::services::ReviewService;
use crate::state::AppState;

/// New review request body.
#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub score: i64,
    pub comment: String,
}

pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(model): Path<String>,
    ApiJson(body): ApiJson<AddReviewRequest>,
) -> Result<StatusCode> {
    ReviewService::new(state.pool())
        .add(&customer.username, &model, body.score, &body.comment)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn list(
    State(state): State<AppState>,
    _user: RequireAuth,
    Path(model): Path<String>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(ReviewService::new(state.pool()).list(&model).await?))
}

/// Delete the caller's own review.
pub async fn delete_own(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(model): Path<String>,
) -> Result<StatusCode> {
    ReviewService::new(state.pool())
        .delete_own(&customer.username, &model)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_for_model(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(model): Path<String>,
) -> Result<StatusCode> {
    ReviewService::new(state.pool())
        .delete_for_model(&model)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_all(State(state): State<AppState>, _staff: RequireStaff) -> Result<StatusCode> {
    ReviewService::new(state.pool()).delete_all().await?;
    Ok(StatusCode::OK)
}
