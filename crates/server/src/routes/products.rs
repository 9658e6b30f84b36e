//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, RequireStaff};
use crate::models::Product;
use crate::services::{ListingQuery, NewProductInput, ProductService};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Product registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProductRequest {
    pub model: String,
    pub category: String,
    pub quantity: i64,
    pub details: Option<String>,
    pub selling_price: f64,
    pub arrival_date: Option<String>,
}

/// Restock request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub quantity: i64,
    pub change_date: Option<String>,
}

/// Sale request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub quantity: i64,
    pub selling_date: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub grouping: Option<String>,
    pub category: Option<String>,
    pub model: Option<String>,
}

impl ListingParams {
    fn as_query(&self) -> ListingQuery<'_> {
        ListingQuery {
            grouping: self.grouping.as_deref(),
            category: self.category.as_deref(),
            model: self.model.as_deref(),
        }
    }
}

/// New stock level.
#[derive(Debug, Serialize)]
pub struct QuantityResponse {
    pub quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn register(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ApiJson(body): ApiJson<RegisterProductRequest>,
) -> Result<StatusCode> {
    ProductService::new(state.pool())
        .register(NewProductInput {
            model: &body.model,
            category: &body.category,
            quantity: body.quantity,
            details: body.details.as_deref(),
            selling_price: body.selling_price,
            arrival_date: body.arrival_date.as_deref(),
        })
        .await?;
    Ok(StatusCode::OK)
}

pub async fn restock(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(model): Path<String>,
    ApiJson(body): ApiJson<RestockRequest>,
) -> Result<Json<QuantityResponse>> {
    let quantity = ProductService::new(state.pool())
        .restock(&model, body.quantity, body.change_date.as_deref())
        .await?;
    Ok(Json(QuantityResponse { quantity }))
}

pub async fn sell(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(model): Path<String>,
    ApiJson(body): ApiJson<SellRequest>,
) -> Result<Json<QuantityResponse>> {
    let quantity = ProductService::new(state.pool())
        .sell(&model, body.quantity, body.selling_date.as_deref())
        .await?;
    Ok(Json(QuantityResponse { quantity }))
}

/// Every product matching the filters. Staff only.
pub async fn list(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.pool())
        .list(params.as_query(), false)
        .await?;
    Ok(Json(products))
}

/// Products in stock matching the filters.
pub async fn list_available(
    State(state): State<AppState>,
    _user: RequireAuth,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.pool())
        .list(params.as_query(), true)
        .await?;
    Ok(Json(products))
}

pub async fn delete(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(model): Path<String>,
) -> Result<StatusCode> {
    ProductService::new(state.pool()).delete(&model).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_all(State(state): State<AppState>, _staff: RequireStaff) -> Result<StatusCode> {
    ProductService::new(state.pool()).delete_all().await?;
    Ok(StatusCode::OK)
}
