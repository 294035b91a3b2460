//! Pallet HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::pallet::{CreatePalletInput, UpdatePalletStatusInput};
use crate::services::PalletService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PalletQuery {
    pub wine_id: Option<Uuid>,
}

/// Pallets, optionally for one wine
pub async fn list_pallets(
    State(state): State<AppState>,
    Query(query): Query<PalletQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = PalletService::new(state.db.clone());
    let pallets = service.list_pallets(query.wine_id).await?;

    tracing::info!("Fetched {} pallets", pallets.len());
    Ok(Json(json!({ "success": true, "pallets": pallets })))
}

/// Fill progress of the wine's current pallet, or null
///
/// Shares its path segment with the wine handle route, so the id is parsed here.
pub async fn get_wine_pallet_status(
    State(state): State<AppState>,
    Path(wine_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let wine_id = Uuid::parse_str(&wine_id)
        .map_err(|_| AppError::field("wine_id", "Invalid wine ID"))?;

    let service = PalletService::new(state.db.clone());
    let progress = service.get_wine_pallet_status(wine_id).await?;
    Ok(Json(progress))
}

/// Create a pallet
pub async fn create_pallet(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(input): Json<CreatePalletInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = PalletService::new(state.db.clone());
    let pallet = service
        .create_pallet(input, state.config.storefront.default_bottles_per_pallet)
        .await?;

    tracing::info!("Pallet {} added by {}", pallet.id, admin.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "pallet": pallet })),
    ))
}

/// Move a pallet to its next status
pub async fn update_pallet_status(
    State(state): State<AppState>,
    Path(pallet_id): Path<Uuid>,
    Json(input): Json<UpdatePalletStatusInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = PalletService::new(state.db.clone());
    let pallet = service.update_pallet_status(pallet_id, input).await?;

    Ok(Json(json!({
        "success": true,
        "pallet": pallet,
        "progress": pallet.progress(),
    })))
}
