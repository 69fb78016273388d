//! Error types for the paper2blog library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PipelineError`] — **Run-fatal**: the run cannot produce an artifact
//!   (rejected input, missing backend credentials, a stage failed). Returned
//!   as `Err(PipelineError)` from the top-level `publish*` functions. A
//!   stage failure always carries the identity of the [`Stage`] that failed.
//!
//! * [`StageError`] — **Stage-level**: one generative round trip went wrong
//!   (reply contained no parseable JSON, the backend rejected the request,
//!   or it was transiently unavailable). The controller never retries a
//!   stage; it wraps the error in [`PipelineError::StageFailed`] and aborts
//!   the run, discarding every record produced so far.
//!
//! The separation lets callers distinguish "fix your input / credentials"
//! from "re-run the whole pipeline later" via [`StageError::is_retryable`].

use std::path::PathBuf;
use thiserror::Error;

/// Identity of a pipeline stage, attached to every stage failure.
///
/// Ordering matches execution order; the `Display` form is the human name
/// used in error messages and progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Extract structured findings from the raw document text.
    Analyzing,
    /// Rewrite findings into audience-appropriate narrative content.
    Simplifying,
    /// Derive visual/diagram/image specifications.
    Visualizing,
    /// Merge everything into a publish-ready artifact.
    Optimizing,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Analyzing,
        Stage::Simplifying,
        Stage::Visualizing,
        Stage::Optimizing,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Analyzing => "Analyzing",
            Stage::Simplifying => "Simplifying",
            Stage::Visualizing => "Visualizing",
            Stage::Optimizing => "Optimizing",
        };
        f.write_str(name)
    }
}

/// All run-fatal errors returned by the paper2blog library.
///
/// Stage-level failures use [`StageError`] and reach callers wrapped in
/// [`PipelineError::StageFailed`].
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document was missing, empty, or ingestion produced too little text.
    ///
    /// User-correctable: prompt for a different file or a manual paste.
    #[error("Input rejected: {reason}")]
    InputRejected { reason: String },

    // ── Backend configuration ─────────────────────────────────────────────
    /// No generative backend could be resolved (missing API key etc.).
    #[error("Generative backend is not configured.\n{hint}")]
    BackendNotConfigured { hint: String },

    // ── Stage failures ────────────────────────────────────────────────────
    /// A pipeline stage failed; the run was aborted and all intermediate
    /// records discarded.
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: StageError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output artifact file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// The stage the run failed in, if it got as far as running a stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether re-invoking the run with the same input may succeed.
    ///
    /// Only transient backend conditions qualify; malformed output and
    /// rejected credentials are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::StageFailed { source, .. } if source.is_retryable()
        )
    }
}

/// An error from a single generative round trip.
///
/// Produced by the shared generation/validation client and the backend;
/// the pipeline controller attaches the failing [`Stage`] on the way out.
#[derive(Debug, Error)]
pub enum StageError {
    /// The backend reply could not be parsed into the expected shape —
    /// either no JSON object was found in the text, or the located object
    /// failed to deserialize.
    #[error("backend reply was not parseable: {detail}")]
    MalformedOutput { detail: String },

    /// The backend refused the request (bad API key, blocked prompt).
    /// Retrying without changing credentials or input will not help.
    #[error("backend rejected the request: {detail}")]
    BackendRejected { detail: String },

    /// Rate limiting or a transient transport failure. The run may be
    /// re-invoked; check `retry_after_secs` for a server-specified delay.
    #[error("backend unavailable: {detail}")]
    BackendUnavailable {
        retry_after_secs: Option<u64>,
        detail: String,
    },
}

impl StageError {
    /// Whether the underlying condition is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::BackendUnavailable { .. })
    }
}
