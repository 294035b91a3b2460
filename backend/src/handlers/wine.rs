//! Wine catalog HTTP handlers: storefront products and admin management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::variant::{CreateImageInput, CreateVariantInput};
use crate::services::wine::CreateWineInput;
use crate::services::{CollectionService, VariantService, WineService};
use crate::AppState;
use shared::CatalogQuery;

/// Storefront wine listing
pub async fn list_store_wines(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = WineService::new(state.db.clone());
    let products = service.get_store_wines(&params).await?;
    Ok(Json(json!({ "products": products })))
}

/// Single storefront wine by handle
pub async fn get_store_wine(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = WineService::new(state.db.clone());
    let product = service.get_store_wine(&handle).await?;
    Ok(Json(product))
}

/// All wine rows for the admin
pub async fn list_wines(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let service = WineService::new(state.db.clone());
    let wines = service.list_wines().await?;
    Ok(Json(json!({ "success": true, "wines": wines })))
}

/// Create a wine
pub async fn create_wine(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(input): Json<CreateWineInput>,
) -> Result<impl IntoResponse, AppError> {
    let storefront = &state.config.storefront;
    let service = WineService::new(state.db.clone());
    let wine = service
        .create_wine(
            input,
            storefront.default_bottles_per_pallet,
            &storefront.currency_code,
        )
        .await?;

    tracing::info!("Wine {} added by {}", wine.handle, admin.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "wine": wine,
            "message": "Wine added successfully",
        })),
    ))
}

/// Variants of a wine
pub async fn list_variants(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = VariantService::new(state.db.clone());
    let variants = service.list_variants(wine_id).await?;
    Ok(Json(json!({ "success": true, "variants": variants })))
}

/// Add a variant to a wine
pub async fn create_variant(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
    Json(input): Json<CreateVariantInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = VariantService::new(state.db.clone());
    let variant = service.create_variant(wine_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "variant": variant,
            "message": "Variant added successfully",
        })),
    ))
}

/// Attach an image to a wine
pub async fn add_image(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
    Json(input): Json<CreateImageInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = VariantService::new(state.db.clone());
    let image = service.add_image(wine_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "image": image,
            "message": "Image added successfully",
        })),
    ))
}

/// Snapshot of what the storefront currently serves
pub async fn debug_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let wines = WineService::new(state.db.clone())
        .get_store_wines(&CatalogQuery::default())
        .await?;
    let collections = CollectionService::new(state.db.clone())
        .get_store_collections()
        .await?;

    tracing::debug!(
        "Catalog debug: {} wines, {} collections",
        wines.len(),
        collections.len()
    );

    Ok(Json(json!({
        "success": true,
        "wines": {
            "count": wines.len(),
            "data": wines.iter().take(2).collect::<Vec<_>>(),
        },
        "collections": {
            "count": collections.len(),
            "data": collections.iter().take(2).collect::<Vec<_>>(),
        },
    })))
}
