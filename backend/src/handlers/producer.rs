//! Producer HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::producer::CreateProducerInput;
use crate::services::ProducerService;
use crate::AppState;

/// All producers
pub async fn list_producers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProducerService::new(state.db.clone());
    let producers = service.list_producers().await?;
    Ok(Json(json!({ "success": true, "producers": producers })))
}

/// Create a producer
pub async fn create_producer(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(input): Json<CreateProducerInput>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProducerService::new(state.db.clone());
    let producer = service.create_producer(input).await?;

    tracing::info!("Producer {} added by {}", producer.handle, admin.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "producer": producer,
            "message": "Producer added successfully",
        })),
    ))
}
