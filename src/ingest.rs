//! Document ingestion: normalise extracted text into a [`Document`].
//!
//! Text extraction itself (PDF parsing, OCR) is an external capability
//! behind the [`TextExtractor`] trait — the crate only owns the boundary:
//! media-type dispatch, whitespace normalisation, and the minimum-length
//! acceptance check. A rejected file is a user-correctable condition
//! (the caller should offer a manual paste), never a pipeline failure.

use crate::error::PipelineError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum number of characters an extraction must yield to be usable.
///
/// Below this the OCR almost certainly failed (blank scan, wrong file),
/// and running the pipeline would only produce hallucinated analysis.
pub const MIN_EXTRACTED_LEN: usize = 50;

/// Input media types the ingestion boundary accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Image,
}

impl MediaType {
    /// Map a declared MIME type onto a supported media type.
    ///
    /// Returns `None` for anything that is neither a PDF nor an image;
    /// callers turn that into [`PipelineError::InputRejected`].
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime == "application/pdf" {
            Some(MediaType::Pdf)
        } else if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else {
            None
        }
    }
}

/// External text-extraction service (PDF parser or OCR engine).
///
/// Treated as a black box that returns plain text or fails. The pipeline
/// never sees the raw bytes — only the normalised text that passes the
/// acceptance check in [`ingest_document`].
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8], media_type: MediaType) -> Result<String, PipelineError>;
}

/// The raw input to a pipeline run.
///
/// Immutable once constructed; `word_count` is the whitespace-token count
/// of the content and is the value every later stage trusts over any
/// backend self-report.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    content: String,
    word_count: usize,
}

impl Document {
    /// Build a document from already-extracted (or hand-pasted) text.
    ///
    /// Rejects empty or whitespace-only input before the pipeline ever
    /// sees it.
    pub fn from_text(text: impl Into<String>) -> Result<Self, PipelineError> {
        let content = text.into();
        if content.trim().is_empty() {
            return Err(PipelineError::InputRejected {
                reason: "document is empty".into(),
            });
        }
        let word_count = content.split_whitespace().count();
        Ok(Self {
            content,
            word_count,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whitespace-token count of the content.
    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

/// Run an uploaded file through the extractor and acceptance checks.
///
/// The declared MIME type picks the extraction path; the extracted text is
/// normalised (line endings, excess blank lines, surrounding whitespace)
/// and must reach [`MIN_EXTRACTED_LEN`] characters to be accepted.
pub async fn ingest_document(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    mime: &str,
) -> Result<Document, PipelineError> {
    let media_type = MediaType::from_mime(mime).ok_or_else(|| PipelineError::InputRejected {
        reason: format!("unsupported file type '{mime}': upload a PDF or image, or paste the text manually"),
    })?;

    let raw = extractor.extract(bytes, media_type).await?;
    let text = normalize_extracted_text(&raw);

    if text.len() < MIN_EXTRACTED_LEN {
        return Err(PipelineError::InputRejected {
            reason: "could not extract enough text from the file: try a different file or paste the text manually".into(),
        });
    }

    Document::from_text(text)
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalise extracted text: CRLF → LF, collapse 3+ consecutive blank
/// lines down to 2, trim surrounding whitespace.
pub fn normalize_extracted_text(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    RE_BLANK_LINES
        .replace_all(&unified, "\n\n")
        .trim()
        .to_string()
}
