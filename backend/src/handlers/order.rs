//! Admin order handlers

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::services::order::OrderFilters;
use crate::services::OrderService;
use crate::AppState;

/// Orders, optionally filtered by pallet, wine or status
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filters): Query<OrderFilters>,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderService::new(state.db.clone());
    let orders = service.list_orders(filters).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Order by number
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderService::new(state.db.clone());
    let order = service.get_order(&order_number).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}
