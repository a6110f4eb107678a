//! Observer hooks called at stage boundaries.

use crate::core::{ExecutionReport, StageId, StageReport};
use crate::errors::CallbackFailure;
use parking_lot::RwLock;

/// Receives notifications as the driver moves through stages.
///
/// Observers run synchronously on the executing thread and must not
/// panic; they cannot influence execution.
#[cfg_attr(test, mockall::automock)]
pub trait LifecycleObserver: Send + Sync {
    /// Called before the first callback of `stage` runs.
    fn on_stage_start(&self, stage: StageId, callbacks: usize);

    /// Called after every callback of a stage completed.
    fn on_stage_complete(&self, report: &StageReport);

    /// Called when a callback fails; the stage and run stop afterwards.
    fn on_callback_failed(&self, failure: &CallbackFailure);

    /// Called when a multi-stage run completes without failure.
    fn on_run_complete(&self, report: &ExecutionReport);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl LifecycleObserver for NoOpObserver {
    fn on_stage_start(&self, _stage: StageId, _callbacks: usize) {}
    fn on_stage_complete(&self, _report: &StageReport) {}
    fn on_callback_failed(&self, _failure: &CallbackFailure) {}
    fn on_run_complete(&self, _report: &ExecutionReport) {}
}

/// Observer that forwards notifications to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl LifecycleObserver for LoggingObserver {
    fn on_stage_start(&self, stage: StageId, callbacks: usize) {
        tracing::info!(stage = %stage, callbacks, "Stage started");
    }

    fn on_stage_complete(&self, report: &StageReport) {
        tracing::info!(
            stage = %report.stage,
            callbacks = report.callbacks_run,
            duration_ms = report.duration_ms,
            "Stage completed"
        );
    }

    fn on_callback_failed(&self, failure: &CallbackFailure) {
        tracing::error!(
            stage = %failure.stage,
            index = failure.index,
            callback = %failure.display_name(),
            panicked = failure.panicked,
            error = %failure.message,
            "Stage callback failed"
        );
    }

    fn on_run_complete(&self, report: &ExecutionReport) {
        tracing::info!(
            run_id = %report.run_id,
            stages = report.stages.len(),
            callbacks = report.callbacks_run(),
            duration_ms = report.duration_ms,
            "Lifecycle run completed"
        );
    }
}

/// An event recorded by [`CollectingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    /// A stage started with this many callbacks.
    StageStarted(StageId, usize),
    /// A stage completed.
    StageCompleted(StageId),
    /// A callback failed in this stage at this index.
    CallbackFailed(StageId, usize),
    /// A run completed over this many stages.
    RunCompleted(usize),
}

/// Observer that records every notification, for tests.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: RwLock<Vec<ObservedEvent>>,
}

impl CollectingObserver {
    /// Creates an empty collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.read().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl LifecycleObserver for CollectingObserver {
    fn on_stage_start(&self, stage: StageId, callbacks: usize) {
        self.events
            .write()
            .push(ObservedEvent::StageStarted(stage, callbacks));
    }

    fn on_stage_complete(&self, report: &StageReport) {
        self.events
            .write()
            .push(ObservedEvent::StageCompleted(report.stage));
    }

    fn on_callback_failed(&self, failure: &CallbackFailure) {
        self.events
            .write()
            .push(ObservedEvent::CallbackFailed(failure.stage, failure.index));
    }

    fn on_run_complete(&self, report: &ExecutionReport) {
        self.events
            .write()
            .push(ObservedEvent::RunCompleted(report.stages.len()));
    }
}
