//! Simplifier stage: [`AnalysisRecord`] → [`SimplifiedRecord`].
//!
//! Higher temperature than the Analyzer — this stage *writes* for a human
//! audience rather than extracting. The backend is asked for at least
//! four sections (what the research is about, key discoveries,
//! methodology, significance); fewer means the reply failed the stage
//! contract. A missing reading time is backfilled deterministically so
//! the field is always populated even when the model forgets it.

use crate::backend::GenerativeBackend;
use crate::error::StageError;
use crate::pipeline::generate::generate_structured;
use crate::prompts::{simplifier_prompt, SIMPLIFIER_SYSTEM_PROMPT};
use crate::records::{AnalysisRecord, SimplifiedRecord};
use tracing::{debug, info};

/// Generative rewriting: allow the model room to phrase.
pub const TEMPERATURE: f32 = 0.7;

/// Minimum number of body sections the contract requires.
pub const MIN_SECTIONS: usize = 4;

/// Average adult reading speed used for the fallback estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Run the Simplifier stage.
pub async fn run(
    backend: &dyn GenerativeBackend,
    analysis: &AnalysisRecord,
    target_audience: &str,
    tone: &str,
) -> Result<SimplifiedRecord, StageError> {
    let prompt = simplifier_prompt(analysis, target_audience, tone);
    let mut record: SimplifiedRecord =
        generate_structured(backend, &prompt, SIMPLIFIER_SYSTEM_PROMPT, TEMPERATURE).await?;

    if record.sections.len() < MIN_SECTIONS {
        return Err(StageError::MalformedOutput {
            detail: format!(
                "simplified content has {} sections, contract requires at least {MIN_SECTIONS}",
                record.sections.len()
            ),
        });
    }

    if record.reading_time.trim().is_empty() {
        record.reading_time = estimate_reading_time(&record);
        debug!(reading_time = %record.reading_time, "backfilled reading time");
    }

    info!(
        title = %record.title,
        sections = record.sections.len(),
        "simplification complete"
    );

    Ok(record)
}

/// Derive a reading-time estimate from the record itself.
///
/// Serializes the full record, counts whitespace tokens, and rounds up to
/// the nearest whole minute at 200 words/minute.
fn estimate_reading_time(record: &SimplifiedRecord) -> String {
    let serialized = serde_json::to_string(record).unwrap_or_default();
    let words = serialized.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationRequest;
    use crate::records::Methodology;
    use async_trait::async_trait;

    struct CannedBackend(String);

    #[async_trait]
    impl GenerativeBackend for CannedBackend {
        async fn generate(&self, _req: GenerationRequest<'_>) -> Result<String, StageError> {
            Ok(self.0.clone())
        }
    }

    fn analysis() -> AnalysisRecord {
        AnalysisRecord {
            title: "A Study of Sleep".into(),
            abstract_text: "Sleep matters.".into(),
            key_findings: vec!["eight hours helps".into()],
            methodology: Methodology {
                approach: "cohort study".into(),
                data_collection: "wearables".into(),
                analysis: "regression".into(),
            },
            main_topics: vec!["sleep".into()],
            technical_terms: vec!["REM".into()],
            conclusions: "Sleep more.".into(),
            citations: 12,
            word_count: 500,
        }
    }

    fn simplified_reply(reading_time: &str) -> String {
        format!(
            r#"{{
                "title": "Why Sleep Is Your Superpower",
                "hook": "You spend a third of your life doing it.",
                "introduction": "Sleep research has come a long way.",
                "sections": [
                    {{"heading": "What the research looked at", "content": "..."}},
                    {{"heading": "The key discoveries", "content": "..."}},
                    {{"heading": "How the study worked", "content": "..."}},
                    {{"heading": "Why it matters", "content": "..."}}
                ],
                "callToAction": "Go to bed earlier tonight.",
                "readingTime": "{reading_time}",
                "targetAudience": "General public",
                "tone": "Engaging"
            }}"#
        )
    }

    #[tokio::test]
    async fn backend_reading_time_is_preserved() {
        let backend = CannedBackend(simplified_reply("7 min read"));
        let record = run(&backend, &analysis(), "General public", "Engaging")
            .await
            .unwrap();
        assert_eq!(record.reading_time, "7 min read");
    }

    #[tokio::test]
    async fn missing_reading_time_is_backfilled() {
        let backend = CannedBackend(simplified_reply(""));
        let record = run(&backend, &analysis(), "General public", "Engaging")
            .await
            .unwrap();
        assert!(record.reading_time.ends_with(" min read"));

        // ceil(words / 200) over the serialized record
        let words = serde_json::to_string(&record)
            .unwrap()
            .split_whitespace()
            .count();
        let expected = words.div_ceil(200);
        assert_eq!(record.reading_time, format!("{expected} min read"));
    }

    #[tokio::test]
    async fn fewer_than_four_sections_fails_the_contract() {
        let reply = r#"{
            "title": "t", "hook": "h", "introduction": "i",
            "sections": [
                {"heading": "only", "content": "one"},
                {"heading": "and", "content": "two"}
            ],
            "callToAction": "cta",
            "targetAudience": "General public",
            "tone": "Engaging"
        }"#;
        let backend = CannedBackend(reply.to_string());
        let err = run(&backend, &analysis(), "General public", "Engaging")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::MalformedOutput { detail } if detail.contains("sections")));
    }
}
