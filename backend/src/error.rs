//! Error handling for the Pallet Wine Store
//!
//! Provides consistent error responses in English and Swedish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::PalletError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_sv: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Pallet capacity exhausted: {0}")]
    PalletCapacity(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Cart is empty")]
    EmptyCart,

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on a single field
    pub fn field(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_sv: format!("Ogiltiga uppgifter: {}", message),
        }
    }
}

/// Field name behind a unique constraint: `wines_handle_key` -> `handle`
pub fn constraint_field(constraint: &str) -> String {
    let base = constraint.strip_suffix("_key").unwrap_or(constraint);
    match base.split_once('_') {
        Some((_, field)) if !field.is_empty() => field.to_string(),
        _ => base.to_string(),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = db_err
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or_else(|| "value".to_string());
                return AppError::DuplicateEntry(field);
            }
        }
        AppError::DatabaseError(err)
    }
}

impl From<PalletError> for AppError {
    fn from(err: PalletError) -> Self {
        match err {
            PalletError::InvalidQuantity(_) => AppError::field("quantity", &err.to_string()),
            PalletError::InvalidTarget(_) => AppError::field("target_bottles", &err.to_string()),
            PalletError::CapacityExceeded { .. } => AppError::PalletCapacity(err.to_string()),
            PalletError::InvalidTransition { .. } => {
                AppError::InvalidStateTransition(err.to_string())
            }
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_sv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid email or password".to_string(),
                    message_sv: "Felaktig e-post eller lösenord".to_string(),
                    field: None,
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_sv: "Token har gått ut".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_sv: "Ogiltig token".to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_sv: "Du har inte behörighet att utföra denna åtgärd".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_sv,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_sv: message_sv.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_sv: format!("Ogiltiga uppgifter: {}", msg),
                    field: None,
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_sv: format!("Det finns redan en post med detta värde för {}", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_sv: format!("{} hittades inte", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_sv: format!("Statusen kan inte ändras: {}", msg),
                    field: None,
                },
            ),
            AppError::PalletCapacity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "PALLET_CAPACITY_EXHAUSTED".to_string(),
                    message_en: msg.clone(),
                    message_sv: format!("Pallkapaciteten räcker inte: {}", msg),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::Unavailable(what) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "NOT_AVAILABLE".to_string(),
                    message_en: format!("{} is not available for sale", what),
                    message_sv: format!("{} är inte tillgänglig för köp", what),
                    field: None,
                },
            ),
            AppError::EmptyCart => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "EMPTY_CART".to_string(),
                    message_en: "Cart is empty".to_string(),
                    message_sv: "Varukorgen är tom".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_sv: "Ett databasfel uppstod".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_sv: "Ett internt serverfel uppstod".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("wines_handle_key"), "handle");
        assert_eq!(constraint_field("orders_order_number_key"), "order_number");
        assert_eq!(constraint_field("custom"), "custom");
    }

    #[test]
    fn test_pallet_errors_map_to_status() {
        let capacity: AppError = PalletError::CapacityExceeded {
            max_pallets: 1,
            requested: 60,
        }
        .into();
        assert_eq!(
            capacity.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let quantity: AppError = PalletError::InvalidQuantity(0).into();
        assert_eq!(quantity.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("Wine".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
