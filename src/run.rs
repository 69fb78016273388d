//! The pipeline controller: an explicit state machine over the four stages.
//!
//! A run is a tagged state value plus a transition function, not a chain
//! of nested futures — tests can walk a [`PipelineRun`] one [`step`] at a
//! time with a fake backend and assert on the state between transitions.
//!
//! ```text
//! Idle ─▶ Analyzing ─▶ Simplifying ─▶ Visualizing ─▶ Optimizing ─▶ Complete
//!             │             │              │              │
//!             └─────────────┴──────┬───────┴──────────────┘
//!                                  ▼
//!                         Failed(stage, error)
//! ```
//!
//! The run is atomic: on the first stage failure every record produced so
//! far is discarded, the state becomes `Failed`, and the error — tagged
//! with the failing stage — is surfaced to the caller. There is no
//! internal retry and no partial resume; the only recovery path is
//! re-invoking a fresh run. All accumulated records live in the
//! run-scoped context, so independent runs share no mutable state and an
//! abandoned run simply drops with its future.
//!
//! [`step`]: PipelineRun::step

use crate::backend::GenerativeBackend;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Stage, StageError};
use crate::ingest::Document;
use crate::pipeline::{analyze, optimize, simplify, visualize};
use crate::records::{AnalysisRecord, PublishArtifact, SimplifiedRecord, VisualPlan};
use tracing::{info, warn};

/// Where a run currently is.
///
/// The four stage states mean "this stage runs on the next step"; the
/// record a stage produced is stored when the state advances past it.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Idle,
    Analyzing,
    Simplifying,
    Visualizing,
    Optimizing,
    Complete,
    /// Terminal failure; `error` is the human-readable cause.
    Failed { stage: Stage, error: String },
}

impl RunState {
    /// The stage this state is about to execute, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunState::Analyzing => Some(Stage::Analyzing),
            RunState::Simplifying => Some(Stage::Simplifying),
            RunState::Visualizing => Some(Stage::Visualizing),
            RunState::Optimizing => Some(Stage::Optimizing),
            _ => None,
        }
    }

    /// Whether the run has ended, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed { .. })
    }
}

/// One end-to-end execution over a single [`Document`].
///
/// Owns the document, the per-run parameters, and every record produced
/// so far. Records are exposed read-only and only once their producing
/// stage has completed — a stage either yields a full record or nothing.
pub struct PipelineRun {
    state: RunState,
    document: Document,
    target_audience: String,
    tone: String,
    keywords: Option<String>,
    analysis: Option<AnalysisRecord>,
    simplified: Option<SimplifiedRecord>,
    visuals: Option<VisualPlan>,
    artifact: Option<PublishArtifact>,
}

impl PipelineRun {
    /// Start a run in `Idle`, holding only the document and parameters.
    pub fn new(document: Document, config: &PipelineConfig) -> Self {
        Self {
            state: RunState::Idle,
            document,
            target_audience: config.target_audience.clone(),
            tone: config.tone.clone(),
            keywords: config.keywords.clone(),
            analysis: None,
            simplified: None,
            visuals: None,
            artifact: None,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn analysis(&self) -> Option<&AnalysisRecord> {
        self.analysis.as_ref()
    }

    pub fn simplified(&self) -> Option<&SimplifiedRecord> {
        self.simplified.as_ref()
    }

    pub fn visuals(&self) -> Option<&VisualPlan> {
        self.visuals.as_ref()
    }

    /// The terminal artifact; `Some` only in `Complete`.
    pub fn artifact(&self) -> Option<&PublishArtifact> {
        self.artifact.as_ref()
    }

    /// Perform one transition.
    ///
    /// From `Idle` this only advances to `Analyzing` (no network); from a
    /// stage state it executes that stage's round trip and either stores
    /// the record and advances, or fails the whole run. Stepping a
    /// terminal run is a no-op.
    pub async fn step(
        &mut self,
        backend: &dyn GenerativeBackend,
    ) -> Result<&RunState, PipelineError> {
        match self.state {
            RunState::Idle => {
                self.state = RunState::Analyzing;
            }
            RunState::Analyzing => {
                let result = analyze::run(backend, &self.document).await;
                let record = self.check(Stage::Analyzing, result)?;
                self.analysis = Some(record);
                self.state = RunState::Simplifying;
            }
            RunState::Simplifying => {
                // The upstream record is guaranteed by the state machine;
                // a hole here is a bug, not a recoverable condition.
                let analysis = self.analysis.as_ref().ok_or_else(|| {
                    PipelineError::Internal("Simplifying entered without an analysis".into())
                })?;
                let result =
                    simplify::run(backend, analysis, &self.target_audience, &self.tone).await;
                let record = self.check(Stage::Simplifying, result)?;
                self.simplified = Some(record);
                self.state = RunState::Visualizing;
            }
            RunState::Visualizing => {
                let (analysis, simplified) = match (&self.analysis, &self.simplified) {
                    (Some(a), Some(s)) => (a, s),
                    _ => {
                        return Err(PipelineError::Internal(
                            "Visualizing entered without upstream records".into(),
                        ))
                    }
                };
                let result = visualize::run(backend, analysis, simplified).await;
                let record = self.check(Stage::Visualizing, result)?;
                self.visuals = Some(record);
                self.state = RunState::Optimizing;
            }
            RunState::Optimizing => {
                let (simplified, visuals) = match (&self.simplified, &self.visuals) {
                    (Some(s), Some(v)) => (s, v),
                    _ => {
                        return Err(PipelineError::Internal(
                            "Optimizing entered without upstream records".into(),
                        ))
                    }
                };
                let result =
                    optimize::run(backend, simplified, visuals, self.keywords.as_deref()).await;
                let record = self.check(Stage::Optimizing, result)?;
                self.artifact = Some(record);
                self.state = RunState::Complete;
                info!("pipeline run complete");
            }
            RunState::Complete | RunState::Failed { .. } => {}
        }
        Ok(&self.state)
    }

    /// Drive the run to a terminal state and return the artifact.
    pub async fn run(
        &mut self,
        backend: &dyn GenerativeBackend,
    ) -> Result<PublishArtifact, PipelineError> {
        if let RunState::Failed { stage, error } = &self.state {
            return Err(PipelineError::Internal(format!(
                "run already failed during {stage}: {error}"
            )));
        }
        while !self.state.is_terminal() {
            self.step(backend).await?;
        }
        self.artifact
            .clone()
            .ok_or_else(|| PipelineError::Internal("terminal run holds no artifact".into()))
    }

    /// On stage failure: discard all records, enter `Failed`, surface the
    /// tagged error. The run is atomic — a failed run retains nothing.
    fn check<T>(
        &mut self,
        stage: Stage,
        result: Result<T, StageError>,
    ) -> Result<T, PipelineError> {
        match result {
            Ok(value) => Ok(value),
            Err(source) => {
                warn!(%stage, error = %source, "stage failed, aborting run");
                self.analysis = None;
                self.simplified = None;
                self.visuals = None;
                self.artifact = None;
                self.state = RunState::Failed {
                    stage,
                    error: source.to_string(),
                };
                Err(PipelineError::StageFailed { stage, source })
            }
        }
    }
}
