//! Ingestion: extract, structure, then remove the upload.
//!
//! Only extraction can fail the request. Removing the uploaded file is
//! best-effort: a failed delete is logged and the structured result still
//! reaches the caller.

use std::path::Path;

use tracing::{info, warn};

use crate::ingest::extractor::{ExtractError, TextExtractor};
use crate::ingest::structuring::{StructuredResume, StructuringEngine};

#[derive(Clone)]
pub struct IngestionPipeline {
    extractor: TextExtractor,
    engine: StructuringEngine,
}

impl IngestionPipeline {
    pub fn new(extractor: TextExtractor, engine: StructuringEngine) -> Self {
        Self { extractor, engine }
    }

    pub fn engine(&self) -> &StructuringEngine {
        &self.engine
    }

    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn ingest(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<StructuredResume, ExtractError> {
        let text = match self.extractor.extract(path, mime_type).await {
            Ok(text) => text,
            Err(e) => {
                remove_upload(path).await;
                return Err(e);
            }
        };

        let structured = self.engine.structure(&text).await;
        remove_upload(path).await;

        info!("Resume ingested via {:?}", structured.source);
        Ok(structured)
    }
}

async fn remove_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove uploaded file {}: {e}", path.display());
    }
}
