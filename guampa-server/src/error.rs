//! HTTP error type
//!
//! Clients only ever see a status code and a short message; details of
//! internal failures go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by handlers and middleware
#[derive(Debug, Error)]
pub enum ApiError {
    /// Not logged in, or bad credentials (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown document, sentence or route (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request or failed operation (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Persistence failure (500, or 404 for missing rows)
    #[error(transparent)]
    Common(#[from] guampa_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Common(guampa_common::Error::NotFound { entity, key }) => (
                StatusCode::NOT_FOUND,
                format!("{} not found: {}", entity, key),
            ),
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                internal()
            }
            ApiError::Common(err) => {
                error!("Request failed: {}", err);
                internal()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
