//! Asks the language model to turn resume text into a
//! `ParsedResume`, degrading to the heuristic fallback on any failure.
//!
//! The model is treated as a best-effort oracle: one request, no retry, output
//! repaired into the canonical shape. The returned `source` tells callers which
//! path produced the data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::fallback::fallback_structure;
use crate::ingest::models::ParsedResume;
use crate::ingest::prompts::build_resume_prompt;
use crate::llm_client::{strip_json_fences, ChatCompletion, LlmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuringSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    pub source: StructuringSource,
    pub data: ParsedResume,
}

#[derive(Debug, Error)]
enum StructuringError {
    #[error("no language model configured")]
    Disabled,

    #[error("no text to structure")]
    EmptyText,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model response is not a JSON object")]
    NotAnObject,
}

#[derive(Clone)]
pub struct StructuringEngine {
    llm: Option<Arc<dyn ChatCompletion>>,
}

impl StructuringEngine {
    pub fn new(llm: Arc<dyn ChatCompletion>) -> Self {
        Self { llm: Some(llm) }
    }

    /// An engine that always uses the heuristic fallback.
    pub fn fallback_only() -> Self {
        Self { llm: None }
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Never fails: any model-side problem is logged and answered by the fallback.
    pub async fn structure(&self, text: &str) -> StructuredResume {
        match self.structure_with_ai(text).await {
            Ok(data) => {
                info!("Resume structured by language model");
                StructuredResume {
                    source: StructuringSource::Ai,
                    data,
                }
            }
            Err(e) => {
                match e {
                    StructuringError::Disabled | StructuringError::EmptyText => {
                        info!("Using heuristic resume structuring: {e}")
                    }
                    _ => warn!("AI structuring failed, using heuristic fallback: {e}"),
                }
                StructuredResume {
                    source: StructuringSource::Fallback,
                    data: fallback_structure(text),
                }
            }
        }
    }

    async fn structure_with_ai(&self, text: &str) -> Result<ParsedResume, StructuringError> {
        let llm = self.llm.as_ref().ok_or(StructuringError::Disabled)?;
        if text.trim().is_empty() {
            return Err(StructuringError::EmptyText);
        }

        let prompt = build_resume_prompt(text);
        let response = llm.complete(&prompt).await?;
        let value: Value = serde_json::from_str(strip_json_fences(&response))?;

        ParsedResume::from_model_output(&value).ok_or(StructuringError::NotAnObject)
    }
}
