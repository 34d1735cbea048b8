//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! Every failure is serialized in the discriminated shape the frontend
//! expects:
//!
//! ```json
//! { "success": false, "error": "No hay caja abierta" }
//! ```
//!
//! with an HTTP status that reflects the engine taxonomy: validation 400,
//! not-found 404, conflict 409, storage 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cantina_db::{DbError, EngineError};

/// API error returned from HTTP handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Wire shape of a failure.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Creates a validation (400) error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a not-found (404) error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converts engine errors to API errors, preserving the wire messages.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::Validation(_) => ApiError::new(StatusCode::BAD_REQUEST, err.to_string()),
            EngineError::RegisterAlreadyOpen | EngineError::NoOpenRegister => {
                ApiError::new(StatusCode::CONFLICT, err.to_string())
            }
            EngineError::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            EngineError::Storage(db_err) => storage_error(db_err),
        }
    }
}

/// Converts raw storage errors (repository paths) to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        storage_error(&err)
    }
}

fn storage_error(err: &DbError) -> ApiError {
    match err {
        DbError::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
        DbError::UniqueViolation { .. } => ApiError::new(StatusCode::CONFLICT, err.to_string()),
        DbError::ForeignKeyViolation { .. } => ApiError::new(
            StatusCode::CONFLICT,
            "Record is referenced by other data".to_string(),
        ),
        other => {
            // Log the detail, return an opaque failure the client may retry.
            tracing::error!(error = %other, "Storage failure");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database operation failed".to_string(),
            )
        }
    }
}
