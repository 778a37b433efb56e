//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps validation failures and request framing problems to HTTP status
//! codes with JSON error bodies carrying a code, a message, and (for
//! rejected payloads) the per-field details.
//! Never exposes internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clsv_core::ValidationFailure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
///
/// The `details` field lists field errors for 422 responses and is omitted
/// otherwise.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for rejected payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The rule engine refused the payload. Carried unmodified.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Request body could not be read or parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the read limit, in bytes (413).
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(ValidationFailure::Rejected { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::Validation(ValidationFailure::Shape { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "SHAPE_MISMATCH")
            }
            // A schema that does not compile is a server-side declaration bug.
            Self::Validation(ValidationFailure::Schema { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
        }
    }

    /// Failures caused by the server's own declarations. Logged, never echoed.
    fn is_internal(&self) -> bool {
        matches!(self, Self::Validation(ValidationFailure::Schema { .. }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
        }

        let (message, details) = match &self {
            _ if self.is_internal() => ("An internal error occurred".to_string(), None),
            Self::Validation(ValidationFailure::Rejected { errors, .. }) => (
                "The request payload failed validation".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}
