//! Axum route handlers for resume upload and parsing.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::models::ParsedResume;
use crate::ingest::structuring::StructuringSource;
use crate::state::AppState;

/// Multipart field carrying the resume file.
const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumeResponse {
    pub success: bool,
    pub filename: String,
    pub original_name: String,
    /// Whether `data` came from the language model or the heuristic fallback.
    pub source: StructuringSource,
    pub data: ParsedResume,
}

/// POST /api/upload
///
/// Accepts a multipart `resume` file, stores it, and returns the parsed resume.
/// The stored file is removed once parsing finishes.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let max_bytes = state.uploads.max_bytes();
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;

        if original_name.is_empty() && data.is_empty() {
            continue;
        }

        stored = Some(state.uploads.save(&original_name, &mime_type, data).await?);
        break;
    }

    let upload = stored.ok_or(AppError::NoFile)?;
    info!("Processing file: {}", upload.original_name);

    let structured = state
        .pipeline
        .ingest(&upload.path, &upload.mime_type)
        .await?;

    Ok(Json(UploadResumeResponse {
        success: true,
        filename: upload.filename,
        original_name: upload.original_name,
        source: structured.source,
        data: structured.data,
    }))
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(max_bytes)
    } else {
        AppError::Validation(format!("Malformed multipart upload: {e}"))
    }
}
