//! Optimizer stage: simplified content + visual plan → [`PublishArtifact`].
//!
//! Mid-range temperature: SEO copy benefits from some phrasing freedom
//! but must stay anchored to the content. Two deterministic fixups run
//! after the parse:
//!
//! * keyword hints are tokenized locally (the backend only ever sees the
//!   resolved list), with a fixed default set when the caller supplied
//!   nothing usable;
//! * publish/modified timestamps are filled with the run's current time
//!   only when the backend omitted them — a backend-supplied value is
//!   preserved verbatim.

use crate::backend::GenerativeBackend;
use crate::error::StageError;
use crate::pipeline::generate::generate_structured;
use crate::prompts::{optimizer_prompt, OPTIMIZER_SYSTEM_PROMPT};
use crate::records::{PublishArtifact, SimplifiedRecord, VisualPlan};
use chrono::Utc;
use tracing::info;

pub const TEMPERATURE: f32 = 0.5;

/// Keyword set used when the caller's hint string yields no tokens.
pub const DEFAULT_KEYWORDS: [&str; 3] = ["research", "science", "innovation"];

/// Run the Optimizer stage.
pub async fn run(
    backend: &dyn GenerativeBackend,
    simplified: &SimplifiedRecord,
    visuals: &VisualPlan,
    keywords: Option<&str>,
) -> Result<PublishArtifact, StageError> {
    let keyword_list = resolve_keywords(keywords);

    let prompt = optimizer_prompt(simplified, visuals, &keyword_list);
    let mut artifact: PublishArtifact =
        generate_structured(backend, &prompt, OPTIMIZER_SYSTEM_PROMPT, TEMPERATURE).await?;

    // One clock sample for both fields, so a fresh fill is self-consistent.
    let now = Utc::now().to_rfc3339();
    if artifact.published_date.trim().is_empty() {
        artifact.published_date = now.clone();
    }
    if artifact.last_modified.trim().is_empty() {
        artifact.last_modified = now;
    }

    info!(
        seo_title = %artifact.seo.title,
        keywords = artifact.seo.keywords.len(),
        sections = artifact.content.sections.len(),
        "optimization complete"
    );

    Ok(artifact)
}

/// Tokenize a comma-separated keyword hint string.
///
/// Entries are trimmed and empties dropped; an absent or all-blank hint
/// resolves to [`DEFAULT_KEYWORDS`].
pub fn resolve_keywords(keywords: Option<&str>) -> Vec<String> {
    let tokens: Vec<String> = keywords
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    if tokens.is_empty() {
        DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
    } else {
        tokens
    }
}
