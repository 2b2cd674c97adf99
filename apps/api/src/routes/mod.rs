pub mod health;

use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::errors::AppError;
use crate::ingest::handlers;
use crate::rate_limit;
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Browser hardening headers set on every response unless a handler set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' 'unsafe-inline'; script-src 'self'; \
         img-src 'self' data: https:; object-src 'none'; base-uri 'self'; \
         frame-ancestors 'self'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

async fn route_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.to_string())
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD_BYTES;

    let router = Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api", get(health::api_index_handler))
        .route(
            "/api/upload",
            post(handlers::handle_upload_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit,
        ))
        .with_state(state);

    with_security_headers(router)
}

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ingest::extractor::TextExtractor;
    use crate::ingest::pipeline::IngestionPipeline;
    use crate::ingest::structuring::StructuringEngine;
    use crate::rate_limit::RateLimiter;
    use crate::uploads::UploadStore;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    fn test_state(upload_dir: PathBuf, max_bytes: usize) -> AppState {
        test_state_with_rate_limit(upload_dir, max_bytes, 100)
    }

    fn test_state_with_rate_limit(
        upload_dir: PathBuf,
        max_bytes: usize,
        rate_limit_max: u32,
    ) -> AppState {
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            openai_api_key: None,
            openai_base_url: "http://localhost".to_string(),
            llm_model: "test".to_string(),
            llm_timeout_secs: 1,
            upload_dir: upload_dir.clone(),
            max_upload_bytes: max_bytes,
            frontend_url: "http://localhost:3000".to_string(),
            rate_limit_max,
            rate_limit_window_secs: 900,
        };
        AppState {
            config: Arc::new(config),
            uploads: UploadStore::new(upload_dir, max_bytes),
            pipeline: Arc::new(IngestionPipeline::new(
                TextExtractor::new(),
                StructuringEngine::fallback_only(),
            )),
            rate_limiter: Arc::new(RateLimiter::new(
                rate_limit_max,
                Duration::from_secs(900),
            )),
        }
    }

    fn multipart_body(field: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["aiStructuring"], false);
        assert!(body["model"].is_null());
    }

    fn get_from(uri: &str, peer: &str) -> Request<Body> {
        let mut request = Request::get(uri).body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[tokio::test]
    async fn test_api_index_lists_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let request = Request::get("/api").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["upload"]["resume"]
            .as_str()
            .unwrap()
            .starts_with("POST /api/upload"));
        assert_eq!(body["health"], "GET /health");
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
    }

    #[tokio::test]
    async fn test_rate_limit_per_client_ip() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state_with_rate_limit(
            dir.path().to_path_buf(),
            1024,
            2,
        ));

        for _ in 0..2 {
            let (status, _) = send(router.clone(), get_from("/health", "10.0.0.1:4000")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let response = router
            .clone()
            .oneshot(get_from("/health", "10.0.0.1:4001"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["error"],
            "Too many requests from this IP, please try again later."
        );

        // A different client still has its full allowance.
        let (status, _) = send(router, get_from("/health", "10.0.0.2:4000")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let request = Request::get("/api/nope").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["message"], "The route /api/nope does not exist");
    }

    #[tokio::test]
    async fn test_upload_plain_text_resume() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024 * 1024));
        let body = multipart_body(
            "resume",
            "jane.txt",
            "text/plain",
            b"Jane Doe\nSoftware Engineer\njane@example.com\n555-000-1111",
        );

        let (status, body) = send(router, upload_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["originalName"], "jane.txt");
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["data"]["personalInfo"]["name"], "Jane Doe");
        assert_eq!(body["data"]["personalInfo"]["email"], "jane@example.com");
        assert_eq!(body["data"]["languages"][0], "English");
        assert!(body["filename"].as_str().unwrap().starts_with("resume-"));

        // Upload consumed and cleaned up.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_resume_field() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let body = multipart_body("photo", "me.png", "image/png", b"png");

        let (status, body) = send(router, upload_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let body = multipart_body("resume", "cv.exe", "application/octet-stream", b"MZ");

        let (status, body) = send(router, upload_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid upload");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 16));
        let body = multipart_body("resume", "cv.txt", "text/plain", &[b'a'; 64]);

        let (status, body) = send(router, upload_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File too large");
    }

    #[tokio::test]
    async fn test_upload_corrupt_document_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path().to_path_buf(), 1024));
        let body = multipart_body(
            "resume",
            "cv.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            b"definitely not a zip archive",
        );

        let (status, body) = send(router, upload_request(body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process resume");
        assert!(body["message"].as_str().unwrap().contains("Word document"));
    }
}
