//! System prompts and prompt builders for the four pipeline stages.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening an output-shape instruction
//!    or adding a rule happens in exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live backend, so shape regressions (a renamed JSON key, a dropped
//!    section requirement) are caught cheaply.
//!
//! Each system prompt pins the stage's required JSON output shape; the
//! matching builder function assembles the user-facing prompt body from
//! the upstream records. The backend is *asked* for exact cardinalities
//! (three diagrams, five prompts, …) here, but parsing stays permissive —
//! see the stage modules for what is actually enforced.

use crate::records::{AnalysisRecord, SimplifiedRecord, VisualPlan};

// ── Analyzer ─────────────────────────────────────────────────────────────

/// System instruction for the Analyzer stage.
pub const ANALYZER_SYSTEM_PROMPT: &str = r#"You are a research paper analyzer agent. Your job is to extract and analyze key information from academic papers.

Output ONLY valid JSON with this exact structure:
{
  "title": "extracted paper title",
  "abstract": "paper abstract or summary",
  "keyFindings": ["finding 1", "finding 2", "finding 3", "finding 4"],
  "methodology": {
    "approach": "research approach description",
    "dataCollection": "data collection methods",
    "analysis": "analysis methods used"
  },
  "mainTopics": ["topic 1", "topic 2", "topic 3"],
  "technicalTerms": ["term1", "term2", "term3"],
  "conclusions": "main conclusions",
  "citations": 20,
  "wordCount": 0
}

Be thorough and accurate. Extract real information from the paper."#;

/// Build the Analyzer prompt body around the raw paper text.
pub fn analyzer_prompt(paper_content: &str) -> String {
    format!(
        "Analyze this research paper and extract key information:\n\n\
         {paper_content}\n\n\
         Provide a comprehensive analysis in JSON format."
    )
}

// ── Simplifier ───────────────────────────────────────────────────────────

/// System instruction for the Simplifier stage.
pub const SIMPLIFIER_SYSTEM_PROMPT: &str = r#"You are a content simplification agent. Your job is to translate complex research into engaging, easy-to-understand blog content.

Output ONLY valid JSON with this exact structure:
{
  "title": "engaging blog title",
  "hook": "attention-grabbing opening hook",
  "introduction": "2-3 paragraph introduction",
  "sections": [
    {
      "heading": "section heading",
      "content": "simplified section content with paragraphs"
    }
  ],
  "callToAction": "engaging call to action",
  "readingTime": "X min read",
  "targetAudience": "audience type",
  "tone": "tone style"
}

Make content accessible, engaging, and easy to understand for the target audience."#;

/// Build the Simplifier prompt body from the analysis plus run parameters.
pub fn simplifier_prompt(analysis: &AnalysisRecord, target_audience: &str, tone: &str) -> String {
    format!(
        "Transform this research analysis into an engaging blog post:\n\n\
         **Analysis:**\n{analysis}\n\n\
         **Target Audience:** {target_audience}\n\
         **Tone:** {tone}\n\n\
         Create simplified content that:\n\
         1. Makes technical concepts accessible\n\
         2. Engages the target audience\n\
         3. Maintains accuracy while simplifying\n\
         4. Uses clear section headings\n\
         5. Includes an engaging hook and introduction\n\
         6. Ends with a strong call to action\n\n\
         Output in JSON format with at least 4 sections covering: what the \
         research is about, key discoveries, methodology, and why it matters.",
        analysis = pretty(analysis),
    )
}

// ── Visual-Suggestion ────────────────────────────────────────────────────

/// System instruction for the Visual-Suggestion stage.
pub const VISUALIZER_SYSTEM_PROMPT: &str = r#"You are a visual design agent for blog content. Your job is to suggest visual elements and create detailed image prompts.

Output ONLY valid JSON with this exact structure:
{
  "heroImage": {
    "prompt": "detailed image prompt",
    "url": "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=1200&h=630&fit=crop",
    "alt": "alt text",
    "caption": "image caption"
  },
  "diagrams": [
    {
      "type": "diagram type",
      "description": "what the diagram shows",
      "prompt": "detailed prompt for creating the diagram",
      "url": "https://images.unsplash.com/photo-[id]?w=800&h=600&fit=crop",
      "suggestion": "how to create or what to include"
    }
  ],
  "infographics": [
    {
      "title": "infographic title",
      "elements": [
        {"label": "element label", "value": "element value"}
      ],
      "layout": "grid"
    }
  ],
  "imagePrompts": ["prompt1", "prompt2"],
  "designSuggestions": ["suggestion1", "suggestion2"]
}

Create professional, relevant visual suggestions. Use Unsplash URLs with appropriate photo IDs."#;

/// Build the Visual-Suggestion prompt body from both upstream records.
pub fn visualizer_prompt(analysis: &AnalysisRecord, simplified: &SimplifiedRecord) -> String {
    format!(
        "Create visual design suggestions for this blog post:\n\n\
         **Analysis:**\n{analysis}\n\n\
         **Simplified Content:**\n{simplified}\n\n\
         Generate:\n\
         1. Hero image prompt (main visual for the article)\n\
         2. 3 diagram/visualization suggestions (methodology flowchart, data visualization, concept illustration)\n\
         3. 1 infographic with 4 key statistics/facts\n\
         4. 5 additional image prompts\n\
         5. 5 design suggestions\n\n\
         Use real Unsplash photo IDs in URLs. Make prompts detailed and specific to the research topic.",
        analysis = pretty(analysis),
        simplified = pretty(simplified),
    )
}

// ── Optimizer ────────────────────────────────────────────────────────────

/// System instruction for the Optimizer stage.
pub const OPTIMIZER_SYSTEM_PROMPT: &str = r#"You are an SEO and engagement optimization agent. Your job is to optimize blog content for search engines and reader engagement.

Output ONLY valid JSON with this exact structure:
{
  "seo": {
    "title": "SEO optimized title (50-60 chars)",
    "metaDescription": "meta description (150-160 chars)",
    "keywords": ["keyword1", "keyword2"],
    "slug": "url-slug",
    "ogTitle": "Open Graph title",
    "ogDescription": "OG description",
    "ogImage": "image URL",
    "twitterCard": "summary_large_image"
  },
  "content": {
    "title": "blog title",
    "subtitle": "subtitle",
    "heroImage": {},
    "introduction": "intro text",
    "sections": [],
    "visuals": [],
    "infographics": [],
    "callToAction": "CTA text",
    "readingTime": "X min read"
  },
  "engagement": {
    "headlines": ["headline1", "headline2"],
    "pullQuotes": ["quote1", "quote2"],
    "socialSnippets": {
      "twitter": "tweet text",
      "linkedin": "LinkedIn post",
      "facebook": "Facebook post"
    },
    "tags": ["tag1", "tag2"],
    "relatedTopics": ["topic1", "topic2"]
  },
  "readability": {
    "score": "score description",
    "improvements": ["improvement1"],
    "targetScore": "target description"
  },
  "analytics": {
    "estimatedPageViews": "estimate",
    "shareability": "assessment",
    "bounceRateEstimate": "estimate"
  },
  "publishedDate": "ISO date",
  "lastModified": "ISO date"
}

Optimize for search engines while maintaining readability and engagement."#;

/// Build the Optimizer prompt body from the simplified content, the
/// visual plan, and the resolved keyword list.
pub fn optimizer_prompt(
    simplified: &SimplifiedRecord,
    visuals: &VisualPlan,
    keywords: &[String],
) -> String {
    format!(
        "Optimize this blog post for SEO and engagement:\n\n\
         **Simplified Content:**\n{simplified}\n\n\
         **Visuals:**\n{visuals}\n\n\
         **Keywords:** {keywords}\n\n\
         Create:\n\
         1. SEO-optimized meta tags and descriptions\n\
         2. Engaging social media snippets\n\
         3. Alternative headlines\n\
         4. Pull quotes from the content\n\
         5. Related topics and tags\n\
         6. Readability score and improvements\n\
         7. Analytics estimates\n\n\
         Ensure the title is under 60 characters and meta description under 160 characters.",
        simplified = pretty(simplified),
        visuals = pretty(visuals),
        keywords = keywords.join(", "),
    )
}

/// Pretty-print a record for embedding in a prompt body.
///
/// Serialization of these derive-only types cannot fail; the fallback
/// keeps the signature infallible without an `unwrap` in library code.
fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
