//! Eager (full-run) entry points.
//!
//! This module provides the simple API: hand over a document, wait for
//! the four stages, get the finished [`PublishArtifact`]. Callers that
//! need to observe or test individual transitions use
//! [`crate::run::PipelineRun`] directly; callers that only want progress
//! reporting inject a [`crate::progress::RunProgressCallback`] instead.

use crate::backend::{GeminiBackend, GenerativeBackend};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Stage};
use crate::ingest::Document;
use crate::records::PublishArtifact;
use crate::run::PipelineRun;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Run the full pipeline over a document.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `document` — the ingested or hand-pasted paper text
/// * `config`   — run parameters (audience, tone, keywords, backend)
///
/// # Errors
/// Returns `Err(PipelineError)` when no backend can be resolved or any
/// stage fails; a stage failure names the stage and aborts the run with
/// nothing retained. Check [`PipelineError::is_retryable`] to decide
/// whether re-invoking the run later makes sense.
pub async fn publish(
    document: Document,
    config: &PipelineConfig,
) -> Result<PublishArtifact, PipelineError> {
    let start = Instant::now();
    info!(words = document.word_count(), "starting pipeline run");

    let backend = resolve_backend(config)?;
    let mut run = PipelineRun::new(document, config);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(Stage::ALL.len());
    }

    while !run.state().is_terminal() {
        let entering = run.state().stage();

        if let Some(stage) = entering {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_start(stage);
            }
        }

        match run.step(backend.as_ref()).await {
            Ok(_) => {
                if let Some(stage) = entering {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_stage_complete(stage);
                    }
                }
            }
            Err(e) => {
                if let Some(stage) = entering {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_stage_error(stage, &e.to_string());
                    }
                }
                return Err(e);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete();
    }

    let artifact = run
        .artifact()
        .cloned()
        .ok_or_else(|| PipelineError::Internal("terminal run holds no artifact".into()))?;

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        slug = %artifact.seo.slug,
        "pipeline run complete"
    );

    Ok(artifact)
}

/// Run the pipeline and write the artifact JSON to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files; the
/// destination holds the single most recent successful artifact,
/// last-write-wins.
pub async fn publish_to_file(
    document: Document,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PublishArtifact, PipelineError> {
    let artifact = publish(document, config).await?;
    let path = output_path.as_ref();

    let json = serde_json::to_string_pretty(&artifact)
        .map_err(|e| PipelineError::Internal(format!("artifact serialization: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| PipelineError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| PipelineError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(artifact)
}

/// Synchronous wrapper around [`publish`].
///
/// Creates a temporary tokio runtime internally.
pub fn publish_sync(
    document: Document,
    config: &PipelineConfig,
) -> Result<PublishArtifact, PipelineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PipelineError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(publish(document, config))
}

/// Resolve the generative backend, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — the caller constructed
///    it entirely; used as-is. This is how tests inject fakes.
///
/// 2. **Environment key** — `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) builds
///    a [`GeminiBackend`]; the model comes from `config.model`, then the
///    `PAPER2BLOG_MODEL` env var, then the built-in default.
fn resolve_backend(config: &PipelineConfig) -> Result<Arc<dyn GenerativeBackend>, PipelineError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let mut backend = GeminiBackend::from_env().map_err(|_| PipelineError::BackendNotConfigured {
        hint: "Set GEMINI_API_KEY (or GOOGLE_API_KEY), or inject a backend via \
               PipelineConfig::builder().backend(...)."
            .into(),
    })?;

    let model = config
        .model
        .clone()
        .or_else(|| std::env::var("PAPER2BLOG_MODEL").ok().filter(|m| !m.is_empty()));
    if let Some(model) = model {
        debug!(%model, "using model override");
        backend = backend.with_model(model);
    }

    backend = backend
        .with_max_output_tokens(config.max_output_tokens)
        .with_timeout(Duration::from_secs(config.api_timeout_secs));

    Ok(Arc::new(backend))
}
