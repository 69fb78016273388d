//! Configuration types for a pipeline run.
//!
//! All run behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across runs and to see at a glance why two
//! runs produced different artifacts.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::backend::{GenerativeBackend, DEFAULT_MAX_OUTPUT_TOKENS};
use crate::error::PipelineError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for one paper-to-blog pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use paper2blog::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .target_audience("Developers")
///     .tone("Conversational")
///     .keywords("rust, llm, pipelines")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Backend model identifier. If `None`, the Gemini default is used.
    pub model: Option<String>,

    /// Pre-constructed generative backend. Takes precedence over `model`
    /// and environment detection — useful in tests and for callers that
    /// need custom middleware around the backend.
    pub backend: Option<Arc<dyn GenerativeBackend>>,

    /// Cap on generated tokens per round trip. Default: 4096.
    ///
    /// The Optimizer's artifact is the largest reply by far; below ~2000
    /// tokens it gets silently truncated mid-object and the run fails
    /// with a malformed-output error.
    pub max_output_tokens: u32,

    /// Per-round-trip timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Audience the Simplifier writes for. Default: "General public".
    pub target_audience: String,

    /// Tone the Simplifier writes in. Default: "Engaging".
    pub tone: String,

    /// Comma-separated SEO keyword hints for the Optimizer.
    ///
    /// `None` or an all-blank string resolves to the default keyword set
    /// (`research, science, innovation`).
    pub keywords: Option<String>,

    /// Stage-level progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            backend: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            api_timeout_secs: 120,
            target_audience: "General public".to_string(),
            tone: "Engaging".to_string(),
            keywords: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("model", &self.model)
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("target_audience", &self.target_audience)
            .field("tone", &self.tone)
            .field("keywords", &self.keywords)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn GenerativeBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn target_audience(mut self, audience: impl Into<String>) -> Self {
        self.config.target_audience = audience.into();
        self
    }

    pub fn tone(mut self, tone: impl Into<String>) -> Self {
        self.config.tone = tone.into();
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.config.keywords = Some(keywords.into());
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if c.max_output_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.target_audience.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "target_audience must not be empty".into(),
            ));
        }
        if c.tone.trim().is_empty() {
            return Err(PipelineError::InvalidConfig("tone must not be empty".into()));
        }
        Ok(self.config)
    }
}
