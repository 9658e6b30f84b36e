//! Shopping cart handlers.
//!
//! Everything except the staff-only listing and wipe acts on the caller's
//! own cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use ezelectronics_core::Cart;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{RequireCustomer, RequireStaff};
use crate::services::CartService;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub model: String,
}

pub async fn current(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Json<Cart>> {
    let cart = CartService::new(state.pool())
        .current(&customer.username)
        .await?;
    Ok(Json(cart))
}

pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<StatusCode> {
    CartService::new(state.pool())
        .add(&customer.username, &body.model)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn checkout(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<StatusCode> {
    CartService::new(state.pool())
        .checkout(&customer.username)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn history(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Json<Vec<Cart>>> {
    let carts = CartService::new(state.pool())
        .history(&customer.username)
        .await?;
    Ok(Json(carts))
}

pub async fn remove_unit(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(model): Path<String>,
) -> Result<StatusCode> {
    CartService::new(state.pool())
        .remove_unit(&customer.username, &model)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn clear_current(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<StatusCode> {
    CartService::new(state.pool())
        .clear_current(&customer.username)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn list_all(
    State(state): State<AppState>,
    _staff: RequireStaff,
) -> Result<Json<Vec<Cart>>> {
    Ok(Json(CartService::new(state.pool()).list_all().await?))
}

pub async fn delete_all(State(state): State<AppState>, _staff: RequireStaff) -> Result<StatusCode> {
    CartService::new(state.pool()).delete_all().await?;
    Ok(StatusCode::OK)
}
