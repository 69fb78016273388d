//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! real-time events as the controller moves through the four stages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a WebSocket, or a log
//! stream without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so a single
//! callback can serve multiple independent runs.

use crate::error::Stage;
use std::sync::Arc;

/// Called by the pipeline controller as the run progresses.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. Within one run the events arrive
/// strictly in stage order — there is no concurrent stage execution.
pub trait RunProgressCallback: Send + Sync {
    /// Called once when the run leaves `Idle`.
    fn on_run_start(&self, total_stages: usize) {
        let _ = total_stages;
    }

    /// Called just before a stage's generative round trip is sent.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage produced its record.
    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage failed; the run is aborted after this event.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once when the run reaches `Complete`.
    fn on_run_complete(&self) {}
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_stage_start(&self, _stage: Stage) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stage_complete(&self, _stage: Stage) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stage_error(&self, _stage: Stage, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(4);
        cb.on_stage_start(Stage::Analyzing);
        cb.on_stage_complete(Stage::Analyzing);
        cb.on_stage_error(Stage::Simplifying, "backend unavailable");
        cb.on_run_complete();
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };

        tracker.on_stage_start(Stage::Analyzing);
        tracker.on_stage_complete(Stage::Analyzing);
        tracker.on_stage_start(Stage::Simplifying);
        tracker.on_stage_error(Stage::Simplifying, "rate limited");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn RunProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(4);
        cb.on_stage_start(Stage::Optimizing);
        cb.on_run_complete();
    }
}
