//! Analyzer stage: raw document text → [`AnalysisRecord`].
//!
//! Runs at low temperature — this is extraction, not writing, and
//! creativity only invites invented findings. The one field the backend
//! is never trusted on is `wordCount`: models are unreliable at counting,
//! so the stage overwrites it with the document's actual whitespace-token
//! count after parsing.

use crate::backend::GenerativeBackend;
use crate::error::StageError;
use crate::ingest::Document;
use crate::pipeline::generate::generate_structured;
use crate::prompts::{analyzer_prompt, ANALYZER_SYSTEM_PROMPT};
use crate::records::AnalysisRecord;
use tracing::info;

/// Extraction-type stage: keep the model close to the source text.
pub const TEMPERATURE: f32 = 0.3;

/// Run the Analyzer stage.
///
/// The record must carry at least one key finding and one main topic;
/// a reply without them is malformed, not a thinner-but-valid analysis.
pub async fn run(
    backend: &dyn GenerativeBackend,
    document: &Document,
) -> Result<AnalysisRecord, StageError> {
    let prompt = analyzer_prompt(document.content());
    let mut record: AnalysisRecord =
        generate_structured(backend, &prompt, ANALYZER_SYSTEM_PROMPT, TEMPERATURE).await?;

    if record.key_findings.is_empty() {
        return Err(StageError::MalformedOutput {
            detail: "analysis contained no key findings".into(),
        });
    }
    if record.main_topics.is_empty() {
        return Err(StageError::MalformedOutput {
            detail: "analysis contained no main topics".into(),
        });
    }

    record.word_count = document.word_count();

    info!(
        title = %record.title,
        findings = record.key_findings.len(),
        word_count = record.word_count,
        "analysis complete"
    );

    Ok(record)
}
