//! Structured records produced by the pipeline stages.
//!
//! Every type here is the *validated parse boundary* between the untrusted
//! generative backend and the rest of the crate: a stage either
//! deserializes the backend's reply into one of these records in full, or
//! fails as a unit. Field names are snake_case in Rust and camelCase on
//! the wire (the shape the backend is instructed to emit).
//!
//! `#[serde(default)]` appears exactly where absence is tolerated by
//! contract: visual specifications (only total parse failure is fatal
//! there), the reading-time estimate (backfilled deterministically), and
//! the publish timestamps (filled with the run's current time when the
//! backend omits them). Everything else is required — a missing field is
//! a malformed reply, not a half-built record.

use serde::{Deserialize, Serialize};

// ── Analyzer output ──────────────────────────────────────────────────────

/// Structured findings extracted from the raw document text.
///
/// Produced once by the Analyzer stage and consumed by every later stage.
/// `word_count` is always overwritten by the stage from the document's
/// actual whitespace-token count — models are unreliable at counting, so
/// the backend's self-report is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub key_findings: Vec<String>,
    pub methodology: Methodology,
    pub main_topics: Vec<String>,
    pub technical_terms: Vec<String>,
    pub conclusions: String,
    /// Backend's estimate of the paper's citation count.
    #[serde(default)]
    pub citations: u32,
    /// Whitespace-token count of the source document (stage-computed).
    #[serde(default)]
    pub word_count: usize,
}

/// The methodology triple: how the research was designed, gathered, and analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub approach: String,
    pub data_collection: String,
    pub analysis: String,
}

// ── Simplifier output ────────────────────────────────────────────────────

/// Audience-appropriate narrative content derived from an [`AnalysisRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedRecord {
    pub title: String,
    pub hook: String,
    pub introduction: String,
    pub sections: Vec<Section>,
    pub call_to_action: String,
    /// `"{n} min read"`. Backfilled from the serialized record at
    /// 200 words/minute when the backend leaves it blank.
    #[serde(default)]
    pub reading_time: String,
    pub target_audience: String,
    pub tone: String,
}

/// One body section of the simplified post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub heading: String,
    pub content: String,
}

// ── Visual-Suggestion output ─────────────────────────────────────────────

/// Visual and diagram specifications for the post.
///
/// Entirely absence-tolerant: the requested cardinalities (one hero, three
/// diagrams, one infographic with four elements, five prompts, five design
/// suggestions) are instructions to the backend, not parse requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualPlan {
    #[serde(default)]
    pub hero_image: HeroImage,
    #[serde(default)]
    pub diagrams: Vec<DiagramSpec>,
    #[serde(default)]
    pub infographics: Vec<Infographic>,
    #[serde(default)]
    pub image_prompts: Vec<String>,
    #[serde(default)]
    pub design_suggestions: Vec<String>,
}

/// Specification for the article's main visual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
}

/// One suggested diagram or visualization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSpec {
    #[serde(rename = "type", default)]
    pub diagram_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub suggestion: String,
}

/// A label/value infographic suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infographic {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub elements: Vec<InfographicElement>,
    #[serde(default)]
    pub layout: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicElement {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

// ── Optimizer output ─────────────────────────────────────────────────────

/// The pipeline's terminal output: a publish-ready blog artifact.
///
/// Immutable once produced. Timestamps are RFC 3339 strings; the Optimizer
/// stage fills whichever the backend omitted with the run's current time
/// (a backend-supplied value is preserved verbatim, which keeps timestamp
/// assignment stable across caller-driven re-runs that reuse a reply).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishArtifact {
    pub seo: SeoBlock,
    pub content: ContentBlock,
    pub engagement: EngagementBlock,
    #[serde(default)]
    pub readability: Readability,
    #[serde(default)]
    pub analytics: AnalyticsEstimate,
    #[serde(default)]
    pub published_date: String,
    #[serde(default)]
    pub last_modified: String,
}

/// Search-engine and social-card metadata.
///
/// The ≤60-char title and ≤160-char meta description limits are requested
/// of the backend, never enforced by truncation here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoBlock {
    pub title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub slug: String,
    #[serde(default)]
    pub og_title: String,
    #[serde(default)]
    pub og_description: String,
    #[serde(default)]
    pub og_image: String,
    #[serde(default)]
    pub twitter_card: String,
}

/// The assembled article body: simplified sections merged with visuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub hero_image: HeroImage,
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub visuals: Vec<DiagramSpec>,
    #[serde(default)]
    pub infographics: Vec<Infographic>,
    pub call_to_action: String,
    #[serde(default)]
    pub reading_time: String,
}

/// Alternate headlines, pull quotes, and per-platform social snippets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementBlock {
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub pull_quotes: Vec<String>,
    #[serde(default)]
    pub social_snippets: SocialSnippets,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSnippets {
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub facebook: String,
}

/// Backend's qualitative readability assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub target_score: String,
}

/// Backend's rough engagement/analytics estimates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEstimate {
    #[serde(default)]
    pub estimated_page_views: String,
    #[serde(default)]
    pub shareability: String,
    #[serde(default)]
    pub bounce_rate_estimate: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_record_uses_camel_case_wire_names() {
        let json = r#"{
            "title": "Attention Is All You Need",
            "abstract": "We propose the Transformer.",
            "keyFindings": ["attention replaces recurrence"],
            "methodology": {
                "approach": "architecture ablation",
                "dataCollection": "WMT 2014",
                "analysis": "BLEU comparison"
            },
            "mainTopics": ["machine translation"],
            "technicalTerms": ["multi-head attention"],
            "conclusions": "Attention suffices.",
            "citations": 40000,
            "wordCount": 9
        }"#;

        let record: AnalysisRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.abstract_text, "We propose the Transformer.");
        assert_eq!(record.methodology.data_collection, "WMT 2014");
        assert_eq!(record.key_findings.len(), 1);

        let back = serde_json::to_value(&record).unwrap();
        assert!(back.get("abstract").is_some());
        assert!(back.get("keyFindings").is_some());
        assert!(back.get("abstract_text").is_none());
    }

    #[test]
    fn analysis_record_missing_required_field_fails() {
        // No "methodology" — must fail as a unit rather than parse partially.
        let json = r#"{
            "title": "t",
            "abstract": "a",
            "keyFindings": [],
            "mainTopics": [],
            "technicalTerms": [],
            "conclusions": "c"
        }"#;
        assert!(serde_json::from_str::<AnalysisRecord>(json).is_err());
    }

    #[test]
    fn visual_plan_tolerates_a_bare_object() {
        let plan: VisualPlan = serde_json::from_str("{}").unwrap();
        assert!(plan.diagrams.is_empty());
        assert!(plan.hero_image.url.is_empty());
    }

    #[test]
    fn diagram_type_maps_to_wire_type() {
        let json = r#"{"type": "flowchart", "description": "methodology"}"#;
        let spec: DiagramSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.diagram_type, "flowchart");
        assert_eq!(
            serde_json::to_value(&spec).unwrap()["type"],
            "flowchart"
        );
    }

    #[test]
    fn reading_time_defaults_to_empty_when_absent() {
        let json = r#"{
            "title": "t",
            "hook": "h",
            "introduction": "i",
            "sections": [],
            "callToAction": "cta",
            "targetAudience": "General public",
            "tone": "Engaging"
        }"#;
        let record: SimplifiedRecord = serde_json::from_str(json).unwrap();
        assert!(record.reading_time.is_empty());
    }

    #[test]
    fn artifact_timestamps_default_to_empty_when_absent() {
        let json = r#"{
            "seo": {
                "title": "t",
                "metaDescription": "d",
                "keywords": ["research"],
                "slug": "t"
            },
            "content": {
                "title": "t",
                "introduction": "i",
                "callToAction": "cta"
            },
            "engagement": {}
        }"#;
        let artifact: PublishArtifact = serde_json::from_str(json).unwrap();
        assert!(artifact.published_date.is_empty());
        assert!(artifact.last_modified.is_empty());
        assert!(artifact.readability.score.is_empty());
    }
}
