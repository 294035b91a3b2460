//! Schema bootstrap handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::middleware::CurrentAdmin;
use crate::services::SetupService;
use crate::AppState;

/// Usage message for the setup endpoint
pub async fn setup_usage() -> impl IntoResponse {
    Json(json!({
        "message": "Database setup endpoint. Use POST to run setup.",
        "endpoint": "/api/v1/admin/setup-database",
    }))
}

/// Create the schema and seed the example catalog
pub async fn setup_database(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> impl IntoResponse {
    tracing::info!("Database setup requested by {}", admin.email);
    let service = SetupService::new(state.db.clone());

    let setup = service.setup_database().await;
    if !setup.success {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": setup.message, "details": setup.details })),
        );
    }

    let seeding = service.seed_example_data().await;
    if !seeding.success {
        return (
            StatusCode::OK,
            Json(json!({
                "warning": "Database created but seeding failed",
                "setup": setup,
                "seeding": seeding,
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Database setup and seeding completed successfully!",
            "setup": setup,
            "seeding": seeding,
        })),
    )
}
