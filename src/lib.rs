//! # paper2blog
//!
//! Turn a research paper into an SEO-ready blog artifact using a
//! four-stage LLM pipeline.
//!
//! ## Why this crate?
//!
//! Research papers are written for reviewers, not readers. Summarising
//! one by hand into a blog post means re-deriving the same structure
//! every time — findings, methodology, significance, visuals, SEO
//! metadata. This crate drives a generative backend through that
//! structure as a fixed pipeline: each stage asks the model for one
//! well-defined JSON record, validates it at a parse-or-fail boundary,
//! and hands it to the next stage. The model writes; the pipeline keeps
//! it honest.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document text
//!  │
//!  ├─ 1. Analyze    extract findings, methodology, topics (temp 0.3)
//!  ├─ 2. Simplify   rewrite for the target audience (temp 0.7)
//!  ├─ 3. Visualize  hero image, diagrams, infographic specs (temp 0.7)
//!  ├─ 4. Optimize   SEO metadata, social snippets, timestamps (temp 0.5)
//!  └─ 5. Artifact   publish-ready record + optional Markdown export
//! ```
//!
//! Stages run strictly in order — each consumes the previous records —
//! and the run is atomic: on the first failure everything produced so
//! far is discarded and the error names the failing stage. There is no
//! internal retry; re-invoking the run is the only recovery path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paper2blog::{publish, Document, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend resolved from GEMINI_API_KEY / GOOGLE_API_KEY
//!     let config = PipelineConfig::builder()
//!         .target_audience("General public")
//!         .tone("Engaging")
//!         .keywords("sleep, neuroscience")
//!         .build()?;
//!
//!     let document = Document::from_text(std::fs::read_to_string("paper.txt")?)?;
//!     let artifact = publish(document, &config).await?;
//!     println!("{}", paper2blog::render_markdown(&artifact));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paper2blog` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! paper2blog = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod publish;
pub mod records;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{GeminiBackend, GenerationRequest, GenerativeBackend, DEFAULT_MODEL};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Stage, StageError};
pub use export::render_markdown;
pub use ingest::{ingest_document, Document, MediaType, TextExtractor, MIN_EXTRACTED_LEN};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use publish::{publish, publish_sync, publish_to_file};
pub use records::{
    AnalysisRecord, AnalyticsEstimate, ContentBlock, DiagramSpec, EngagementBlock, HeroImage,
    Infographic, InfographicElement, Methodology, PublishArtifact, Readability, Section, SeoBlock,
    SimplifiedRecord, SocialSnippets, VisualPlan,
};
pub use run::{PipelineRun, RunState};
