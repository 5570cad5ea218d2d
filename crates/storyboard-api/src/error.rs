//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storyboard_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection, pool, or migration error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Upstream provider diagnostics, present only for provider failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamDetail>,
}

/// Upstream status/body embedded in the error envelope.
#[derive(Debug, Serialize)]
pub struct UpstreamDetail {
    pub status: Option<u16>,
    pub detail: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let upstream = match &self.0 {
            DomainError::Upstream { status, detail } => Some(UpstreamDetail {
                status: *status,
                detail: detail.clone(),
            }),
            _ => None,
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            upstream,
        };

        (status, Json(body)).into_response()
    }
}
