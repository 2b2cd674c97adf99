mod config;
mod errors;
mod ingest;
mod llm_client;
mod rate_limit;
mod routes;
mod state;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::extractor::TextExtractor;
use crate::ingest::pipeline::IngestionPipeline;
use crate::ingest::structuring::StructuringEngine;
use crate::llm_client::{ChatCompletion, LlmClient, LlmSettings};
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Upload directory must exist and be writable before accepting requests
    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);
    uploads.ensure_ready().await?;

    let engine = build_structuring_engine(&config)?;
    let pipeline = IngestionPipeline::new(TextExtractor::new(), engine);

    let cors = build_cors(&config)?;
    let rate_limiter = RateLimiter::new(
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        uploads,
        pipeline: Arc::new(pipeline),
        rate_limiter: Arc::new(rate_limiter),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer addresses feed the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Builds the model-backed engine, or a fallback-only one when no key is configured.
fn build_structuring_engine(config: &Config) -> Result<StructuringEngine> {
    let Some(api_key) = config.openai_api_key.clone() else {
        warn!("OPENAI_API_KEY is not set; resumes will be parsed heuristically");
        return Ok(StructuringEngine::fallback_only());
    };

    let client = LlmClient::new(LlmSettings {
        api_key,
        base_url: config.openai_base_url.clone(),
        model: config.llm_model.clone(),
        timeout: Duration::from_secs(config.llm_timeout_secs),
    })?;
    info!("LLM client initialized (model: {})", client.model());

    Ok(StructuringEngine::new(Arc::new(client)))
}

fn build_cors(config: &Config) -> Result<CorsLayer> {
    let mut origins = vec![
        config.frontend_url.as_str(),
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];
    origins.sort_unstable();
    origins.dedup();

    let origins = origins
        .into_iter()
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
