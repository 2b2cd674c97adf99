use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and which model (if any) parses resumes.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let ai_enabled = state.pipeline.engine().is_ai_enabled();
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "features": ["file-upload", "resume-parsing"],
        "aiStructuring": ai_enabled,
        "model": ai_enabled.then(|| state.config.llm_model.clone()),
    }))
}

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Resume Builder API - resume upload and parsing",
        "endpoints": {
            "health": "GET /health",
            "upload": "POST /api/upload"
        }
    }))
}

/// GET /api
/// Endpoint map for API clients.
pub async fn api_index_handler() -> Json<Value> {
    Json(json!({
        "message": format!("Resume Builder API v{}", env!("CARGO_PKG_VERSION")),
        "upload": {
            "resume": "POST /api/upload (multipart field 'resume': PDF, DOCX, DOC or TXT)"
        },
        "health": "GET /health"
    }))
}
