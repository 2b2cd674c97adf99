use std::sync::Arc;

use crate::config::Config;
use crate::ingest::pipeline::IngestionPipeline;
use crate::rate_limit::RateLimiter;
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub uploads: UploadStore,
    /// Stateless per request; uploads never share anything beyond this handle.
    pub pipeline: Arc<IngestionPipeline>,
    pub rate_limiter: Arc<RateLimiter>,
}
