//! Turns an uploaded file into raw text, dispatching on the
//! MIME type declared by the upload layer. The file is never modified or removed.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Word document extraction failed: {0}")]
    Word(String),

    #[error("extraction task failed: {0}")]
    Worker(String),
}

/// Document families the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Both `application/msword` and the OOXML `wordprocessingml` types.
    Word,
    PlainText,
}

impl DocumentKind {
    /// Classifies a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/pdf" {
            Some(Self::Pdf)
        } else if essence.contains("wordprocessingml") || essence.contains("msword") {
            Some(Self::Word)
        } else if essence == "text/plain" {
            Some(Self::PlainText)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts raw text. Unrecognised MIME types yield an empty string rather
    /// than an error; callers treat empty text as degraded input.
    pub async fn extract(&self, path: &Path, mime_type: &str) -> Result<String, ExtractError> {
        let Some(kind) = DocumentKind::from_mime(mime_type) else {
            debug!("No extractor for MIME type '{mime_type}', returning empty text");
            return Ok(String::new());
        };

        let text = match kind {
            DocumentKind::Pdf => {
                let bytes = tokio::fs::read(path).await?;
                tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&bytes)
                        .map_err(|e| ExtractError::Pdf(e.to_string()))
                })
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))??
            }
            DocumentKind::Word => {
                let path: PathBuf = path.to_path_buf();
                tokio::task::spawn_blocking(move || extract_word_text(&path))
                    .await
                    .map_err(|e| ExtractError::Worker(e.to_string()))??
            }
            DocumentKind::PlainText => {
                let bytes = tokio::fs::read(path).await?;
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };

        info!("Extracted text length: {} ({:?})", text.len(), kind);
        Ok(text)
    }
}

/// Reads `word/document.xml` out of an OOXML container.
fn extract_word_text(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractError::Word(format!("not a Word document container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Word(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)?;

    document_xml_to_text(&xml)
}

/// Flattens WordprocessingML body XML into plain text. Each paragraph is
/// followed by a blank line; tabs and explicit breaks are preserved.
fn document_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let chunk = e
                    .unescape()
                    .map_err(|err| ExtractError::Word(format!("malformed text run: {err}")))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Word(format!(
                    "malformed document.xml at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(text)
}
