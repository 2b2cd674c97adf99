use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt"];

const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Local directory where resume uploads wait for ingestion.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

/// A resume written to disk, ready for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the upload directory and probes that it is writable.
    pub async fn ensure_ready(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.dir.display()))?;

        let probe = self.dir.join(format!(".write-probe-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&probe, b"probe")
            .await
            .with_context(|| format!("Upload directory {} is not writable", self.dir.display()))?;
        tokio::fs::remove_file(&probe)
            .await
            .with_context(|| format!("Failed to remove probe file {}", probe.display()))?;

        info!("Upload directory ready: {}", self.dir.display());
        Ok(())
    }

    /// Validates and writes an uploaded resume under a generated unique name.
    pub async fn save(
        &self,
        original_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<StoredUpload, AppError> {
        let extension = validate_resume_file(original_name, mime_type)?;

        if data.len() > self.max_bytes {
            return Err(AppError::FileTooLarge(self.max_bytes));
        }

        let filename = format!(
            "resume-{}-{}.{extension}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("Failed to save upload {}", path.display()))?;

        info!("Saved upload '{original_name}' as {filename} ({} bytes)", data.len());

        Ok(StoredUpload {
            path,
            filename,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

/// Checks the extension and declared MIME type against the resume allowlist.
/// Returns the lower-cased extension.
pub fn validate_resume_file(original_name: &str, mime_type: &str) -> Result<String, AppError> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str())
        && ALLOWED_MIME_TYPES.contains(&essence.as_str())
    {
        Ok(extension)
    } else {
        Err(AppError::Validation(
            "Only PDF, DOCX, DOC, and TXT files are allowed for resumes!".to_string(),
        ))
    }
}
