//! Collection HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::collection::CreateCollectionInput;
use crate::services::{CollectionService, WineService};
use crate::AppState;
use shared::CatalogQuery;

/// Storefront collections
pub async fn list_store_collections(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let service = CollectionService::new(state.db.clone());
    let collections = service.get_store_collections().await?;
    Ok(Json(json!({ "collections": collections })))
}

/// Single storefront collection
pub async fn get_store_collection(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = CollectionService::new(state.db.clone());
    let collection = service.get_store_collection(&handle).await?;
    Ok(Json(collection))
}

/// Wines of a collection
pub async fn get_collection_wines(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(mut params): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let collection = CollectionService::new(state.db.clone())
        .get_store_collection(&handle)
        .await?;

    params.collection = Some(collection.handle.clone());
    let products = WineService::new(state.db.clone())
        .get_store_wines(&params)
        .await?;

    Ok(Json(json!({ "collection": collection, "products": products })))
}

/// All collections for the admin
pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let service = CollectionService::new(state.db.clone());
    let collections = service.list_collections().await?;
    Ok(Json(json!({ "success": true, "collections": collections })))
}

/// Create a collection
pub async fn create_collection(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(input): Json<CreateCollectionInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = CollectionService::new(state.db.clone());
    let collection = service.create_collection(input).await?;

    tracing::info!("Collection {} added by {}", collection.handle, admin.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "collection": collection,
            "message": "Collection added successfully",
        })),
    ))
}
