//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to HTTP status codes. Storage and
//! internal details are logged but never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use twintone_core::error::TwinToneError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "validation_error").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - invalid input or malformed request.
    BadRequest(String),
    /// 503 - generation failed after retries or timed out.
    ServiceUnavailable(String),
    /// 500 - storage failure.
    Persistence(String),
    /// 500 - anything else.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Persistence(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_error",
            ApiError::ServiceUnavailable(_) => "generation_failed",
            ApiError::Persistence(_) => "persistence_failed",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
            ApiError::Persistence(msg) => {
                error!(error = %msg, "Storage error");
                "A storage error occurred".to_string()
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
        };

        let body = ErrorBody {
            error: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<TwinToneError> for ApiError {
    fn from(err: TwinToneError) -> Self {
        match err {
            TwinToneError::Validation(msg) => ApiError::BadRequest(msg),
            TwinToneError::Generation(msg) => ApiError::ServiceUnavailable(msg),
            TwinToneError::Persistence(msg) => ApiError::Persistence(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
