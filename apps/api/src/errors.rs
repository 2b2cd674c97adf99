use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::extractor::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File too large (limit {0} bytes)")]
    FileTooLarge(usize),

    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("Failed to parse resume: {0}")]
    Ingestion(#[from] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::NoFile => (StatusCode::BAD_REQUEST, "No file uploaded", None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid upload", Some(msg.clone()))
            }
            AppError::FileTooLarge(max_bytes) => (
                StatusCode::BAD_REQUEST,
                "File too large",
                Some(format!(
                    "File size must be less than {}MB",
                    max_bytes.div_ceil(1024 * 1024)
                )),
            ),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests from this IP, please try again later.",
                None,
            ),
            AppError::NotFound(uri) => (
                StatusCode::NOT_FOUND,
                "Route not found",
                Some(format!("The route {uri} does not exist")),
            ),
            AppError::Ingestion(e) => {
                tracing::error!("Resume ingestion failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process resume",
                    Some(self.to_string()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some("An internal server error occurred".to_string()),
                )
            }
        };

        let body = match message {
            Some(message) => json!({ "error": error, "message": message }),
            None => json!({ "error": error }),
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after } = &self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after));
        }
        response
    }
}
