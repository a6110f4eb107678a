//! The lifecycle coordinator: set-once stage declaration, callback
//! registration and the sequential stage driver.

use super::{LifecycleConfig, UndeclaredStagePolicy};
use crate::core::{ExecutionReport, LifecycleState, StageId, StageReport, StageSequence};
use crate::errors::{DuplicateStageError, LifecycleError};
use crate::observability::{LifecycleObserver, NoOpObserver};
use crate::registry::{Callback, CallbackRegistry};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Coordinates a linear application lifecycle.
///
/// The host declares the stage sequence once, modules register callbacks
/// against stage ids in whatever order they initialize, and the host then
/// runs all stages (or an explicit list). Every callback of a stage runs,
/// in registration order, before the next stage begins.
///
/// A `Lifecycle` is `Send + Sync`; share it by reference or `Arc`.
pub struct Lifecycle {
    config: LifecycleConfig,
    stages: RwLock<Option<StageSequence>>,
    registry: CallbackRegistry,
    observer: Arc<dyn LifecycleObserver>,
    in_flight: AtomicUsize,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates a lifecycle with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LifecycleConfig::default())
    }

    /// Creates a lifecycle with the given configuration.
    #[must_use]
    pub fn with_config(config: LifecycleConfig) -> Self {
        Self {
            config,
            stages: RwLock::new(None),
            registry: CallbackRegistry::new(),
            observer: Arc::new(NoOpObserver),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Attaches an observer notified at stage boundaries.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Stage declaration
    // ------------------------------------------------------------------

    /// Declares the ordered stage sequence.
    ///
    /// May succeed at most once. The ids are copied; later changes to the
    /// caller's collection have no effect.
    ///
    /// `u64` and `usize` ids convert fallibly; map them through
    /// [`StageId::try_from`] first.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyDeclared`] if stages were already declared,
    ///   whatever the new content. The first declaration stays in effect.
    /// - [`LifecycleError::DuplicateStage`] if an id repeats. Nothing is
    ///   stored and a later valid declaration can still succeed.
    pub fn declare_stages<I, S>(&self, stages: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StageId>,
    {
        let stages: Vec<StageId> = stages.into_iter().map(Into::into).collect();
        self.store_sequence(|| StageSequence::new(stages))
    }

    /// Declares an already validated stage sequence.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyDeclared`] if stages were already declared.
    pub fn declare_sequence(&self, sequence: StageSequence) -> Result<(), LifecycleError> {
        self.store_sequence(|| Ok(sequence))
    }

    fn store_sequence<F>(&self, build: F) -> Result<(), LifecycleError>
    where
        F: FnOnce() -> Result<StageSequence, DuplicateStageError>,
    {
        let mut declared = self.stages.write();

        if let Some(existing) = declared.as_ref() {
            warn!(
                lifecycle = %self.config.name,
                existing = existing.len(),
                "Rejected second stage declaration"
            );
            return Err(LifecycleError::AlreadyDeclared {
                existing: existing.to_vec(),
            });
        }

        let sequence = build().map_err(|err| {
            warn!(
                lifecycle = %self.config.name,
                stage = %err.stage,
                "Rejected stage declaration with duplicate stage"
            );
            LifecycleError::from(err)
        })?;

        info!(
            lifecycle = %self.config.name,
            stages = sequence.len(),
            "Declared lifecycle stages"
        );
        *declared = Some(sequence);
        Ok(())
    }

    /// Returns a copy of the declared stages, or an empty list if none were declared.
    ///
    /// Use [`is_declared`](Self::is_declared) to tell "never declared" from
    /// "declared empty".
    #[must_use]
    pub fn declared_stages(&self) -> Vec<StageId> {
        self.stages
            .read()
            .as_ref()
            .map(StageSequence::to_vec)
            .unwrap_or_default()
    }

    /// Returns a copy of the declared sequence, if any.
    #[must_use]
    pub fn stage_sequence(&self) -> Option<StageSequence> {
        self.stages.read().clone()
    }

    /// Returns true once a declaration has succeeded.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        self.stages.read().is_some()
    }

    /// Returns the current lifecycle state.
    ///
    /// `Executing` is only reported once stages are declared; runs on an
    /// undeclared lifecycle leave it `Undeclared`.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        if !self.is_declared() {
            LifecycleState::Undeclared
        } else if self.in_flight.load(Ordering::SeqCst) > 0 {
            LifecycleState::Executing
        } else {
            LifecycleState::Declared
        }
    }

    // ------------------------------------------------------------------
    // Callback registration
    // ------------------------------------------------------------------

    /// Registers a callback for `stage`.
    ///
    /// The stage does not need to be declared. Callbacks for the same stage
    /// run in the order they were registered.
    pub fn register<S, F>(&self, stage: S, callback: F)
    where
        S: Into<StageId>,
        F: Fn() + Send + Sync + 'static,
    {
        self.registry.register(stage.into(), Callback::new(callback));
    }

    /// Registers a callback whose `Err` aborts the stage.
    pub fn register_fallible<S, F>(&self, stage: S, callback: F)
    where
        S: Into<StageId>,
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.register(stage.into(), Callback::fallible(callback));
    }

    /// Registers a prepared [`Callback`], e.g. one carrying a name.
    pub fn register_callback<S>(&self, stage: S, callback: Callback)
    where
        S: Into<StageId>,
    {
        self.registry.register(stage.into(), callback);
    }

    /// Returns the number of callbacks registered for `stage`.
    #[must_use]
    pub fn callback_count(&self, stage: impl Into<StageId>) -> usize {
        self.registry.callback_count(stage.into())
    }

    /// Returns every stage that has callbacks, declared or not, sorted by id.
    #[must_use]
    pub fn registered_stages(&self) -> Vec<StageId> {
        self.registry.registered_stages()
    }

    /// Returns the callback registry.
    #[must_use]
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Runs every callback registered for `stage`, in registration order.
    ///
    /// A stage with no callbacks is a no-op. Callbacks registered while the
    /// stage is running take effect on its next execution.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::CallbackFailed`] for the first callback that
    /// fails; the remaining callbacks of the stage are skipped.
    pub fn execute_stage(&self, stage: impl Into<StageId>) -> Result<StageReport, LifecycleError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        self.run_stage(stage.into())
    }

    /// Runs the given stages in order, each to completion before the next.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::UndeclaredStage`] under
    ///   [`UndeclaredStagePolicy::Reject`] if any id is not declared; checked
    ///   before any callback runs.
    /// - [`LifecycleError::CallbackFailed`] for the first failing callback;
    ///   later stages do not run.
    pub fn execute_stages<I, S>(&self, stages: I) -> Result<ExecutionReport, LifecycleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StageId>,
    {
        let stages: Vec<StageId> = stages.into_iter().map(Into::into).collect();
        let _guard = InFlightGuard::enter(&self.in_flight);
        self.check_declared(&stages)?;
        self.run_stages(&stages)
    }

    /// Runs every declared stage in declared order.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotDeclared`] if no stages were declared; nothing runs.
    /// - [`LifecycleError::CallbackFailed`] as for [`execute_stages`](Self::execute_stages).
    pub fn execute_all_stages(&self) -> Result<ExecutionReport, LifecycleError> {
        let Some(sequence) = self.stage_sequence() else {
            warn!(
                lifecycle = %self.config.name,
                "Refused to execute all stages before declaration"
            );
            return Err(LifecycleError::NotDeclared);
        };

        let _guard = InFlightGuard::enter(&self.in_flight);
        self.run_stages(sequence.as_slice())
    }

    fn check_declared(&self, stages: &[StageId]) -> Result<(), LifecycleError> {
        if self.config.undeclared_stage_policy == UndeclaredStagePolicy::Allow {
            return Ok(());
        }

        let declared = self.stages.read();
        for &stage in stages {
            let known = declared.as_ref().is_some_and(|seq| seq.contains(stage));
            if !known {
                warn!(
                    lifecycle = %self.config.name,
                    stage = %stage,
                    "Rejected execution of undeclared stage"
                );
                return Err(LifecycleError::UndeclaredStage { stage });
            }
        }
        Ok(())
    }

    fn run_stages(&self, stages: &[StageId]) -> Result<ExecutionReport, LifecycleError> {
        let mut report = ExecutionReport::begin();
        let span = info_span!(
            "lifecycle.execute",
            lifecycle = %self.config.name,
            run_id = %report.run_id
        );
        let _entered = span.enter();

        info!(stages = stages.len(), "Executing lifecycle stages");
        let start = Instant::now();

        for &stage in stages {
            let stage_report = self.run_stage(stage)?;
            report.stages.push(stage_report);
        }

        report.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            stages = report.stages.len(),
            callbacks = report.callbacks_run(),
            duration_ms = report.duration_ms,
            "Lifecycle stages completed"
        );
        self.observer.on_run_complete(&report);
        Ok(report)
    }

    fn run_stage(&self, stage: StageId) -> Result<StageReport, LifecycleError> {
        // Snapshot so no lock is held while callbacks run.
        let callbacks = self.registry.snapshot(stage);
        let start = Instant::now();

        debug!(
            lifecycle = %self.config.name,
            stage = %stage,
            callbacks = callbacks.len(),
            "Executing stage"
        );
        self.observer.on_stage_start(stage, callbacks.len());

        for (index, callback) in callbacks.iter().enumerate() {
            if let Err(failure) = callback.invoke(stage, index, self.config.catch_panics) {
                warn!(
                    lifecycle = %self.config.name,
                    stage = %stage,
                    index,
                    callback = %failure.display_name(),
                    panicked = failure.panicked,
                    error = %failure.message,
                    "Stage callback failed; aborting execution"
                );
                self.observer.on_callback_failed(&failure);
                return Err(failure.into());
            }
        }

        let report = StageReport::new(
            stage,
            callbacks.len(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        debug!(
            lifecycle = %self.config.name,
            stage = %stage,
            duration_ms = report.duration_ms,
            "Stage completed"
        );
        self.observer.on_stage_complete(&report);
        Ok(report)
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("stages", &self.declared_stages())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Counts in-flight executions; decremented on drop so unwinding panics
/// leave the count correct.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::observability::{CollectingObserver, MockLifecycleObserver, ObservedEvent};
    use crate::testing::CallLog;
    use pretty_assertions::assert_eq;

    fn ids(values: &[i64]) -> Vec<StageId> {
        values.iter().copied().map(StageId::new).collect()
    }

    #[test]
    fn test_lifecycle_creation() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Undeclared);
        assert!(!lifecycle.is_declared());
        assert!(lifecycle.declared_stages().is_empty());
        assert!(lifecycle.stage_sequence().is_none());
    }

    #[test]
    fn test_declare_and_query_round_trip() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([10, 3, 7]).unwrap();

        assert_eq!(lifecycle.declared_stages(), ids(&[10, 3, 7]));
        assert_eq!(lifecycle.state(), LifecycleState::Declared);
    }

    #[test]
    fn test_declare_copies_input() {
        let lifecycle = Lifecycle::new();
        let mut input = ids(&[1, 2, 3]);
        lifecycle.declare_stages(input.clone()).unwrap();

        input.push(StageId::new(4));
        let mut returned = lifecycle.declared_stages();
        returned.clear();

        assert_eq!(lifecycle.declared_stages(), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_second_declaration_rejected() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([1, 2]).unwrap();

        let err = lifecycle.declare_stages([1, 2]).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyDeclared { .. }));
        assert_eq!(err.kind(), ErrorKind::ProtocolMisuse);

        let err = lifecycle.declare_stages([5, 6, 7]).unwrap_err();
        match err {
            LifecycleError::AlreadyDeclared { existing } => assert_eq!(existing, ids(&[1, 2])),
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(lifecycle.declared_stages(), ids(&[1, 2]));
    }

    #[test]
    fn test_second_declaration_with_duplicates_reports_already_declared() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([1]).unwrap();

        let err = lifecycle.declare_stages([2, 2]).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyDeclared { .. }));
    }

    #[test]
    fn test_duplicate_declaration_stores_nothing() {
        let lifecycle = Lifecycle::new();

        let err = lifecycle.declare_stages([1, 2, 1]).unwrap_err();
        assert!(matches!(err, LifecycleError::DuplicateStage(_)));
        assert!(err.is_fatal());
        assert!(!lifecycle.is_declared());
        assert!(lifecycle.declared_stages().is_empty());

        lifecycle.declare_stages([1, 2]).unwrap();
        assert_eq!(lifecycle.declared_stages(), ids(&[1, 2]));
    }

    #[test]
    fn test_declare_empty_sequence() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages(Vec::<StageId>::new()).unwrap();

        assert!(lifecycle.is_declared());
        assert!(lifecycle.declared_stages().is_empty());

        let report = lifecycle.execute_all_stages().unwrap();
        assert!(report.stages.is_empty());
    }

    #[test]
    fn test_declare_sequence() {
        let lifecycle = Lifecycle::new();
        let sequence = StageSequence::new([4, 5]).unwrap();
        lifecycle.declare_sequence(sequence.clone()).unwrap();

        assert_eq!(lifecycle.stage_sequence(), Some(sequence.clone()));
        assert!(lifecycle.declare_sequence(sequence).is_err());
    }

    #[test]
    fn test_register_counts() {
        let lifecycle = Lifecycle::new();
        lifecycle.register(1, || {});
        lifecycle.register(1, || {});
        lifecycle.register_fallible(2, || Ok(()));
        lifecycle.register_callback(99, Callback::new(|| {}).with_name("orphan"));

        assert_eq!(lifecycle.callback_count(1), 2);
        assert_eq!(lifecycle.callback_count(2), 1);
        assert_eq!(lifecycle.callback_count(3), 0);
        assert_eq!(lifecycle.registered_stages(), ids(&[1, 2, 99]));
        assert_eq!(lifecycle.registry().total_callbacks(), 4);
    }

    #[test]
    fn test_execute_stage_in_registration_order() {
        let lifecycle = Lifecycle::new();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("a"));
        lifecycle.register(1, log.recorder("b"));
        lifecycle.register(1, log.recorder("c"));

        let report = lifecycle.execute_stage(1).unwrap();

        assert_eq!(report.callbacks_run, 3);
        assert_eq!(log.entries(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_execute_stage_without_callbacks() {
        let lifecycle = Lifecycle::new();
        let report = lifecycle.execute_stage(5).unwrap();

        assert_eq!(report.stage, StageId::new(5));
        assert!(report.was_empty());
    }

    #[test]
    fn test_execute_stage_twice_runs_twice() {
        let lifecycle = Lifecycle::new();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("x"));

        lifecycle.execute_stage(1).unwrap();
        lifecycle.execute_stage(1).unwrap();

        assert_eq!(log.entries(), vec!["x", "x"]);
    }

    #[test]
    fn test_execute_stages_in_given_order() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([1, 2, 3]).unwrap();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("1"));
        lifecycle.register(2, log.recorder("2"));
        lifecycle.register(3, log.recorder("3"));

        let report = lifecycle.execute_stages([3, 1]).unwrap();

        assert_eq!(log.entries(), vec!["3", "1"]);
        assert_eq!(report.stages_run(), ids(&[3, 1]));
    }

    #[test]
    fn test_execute_undeclared_stage_allowed_by_default() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([1]).unwrap();
        let log = CallLog::new();
        lifecycle.register(42, log.recorder("orphan"));

        lifecycle.execute_stages([42]).unwrap();
        assert_eq!(log.entries(), vec!["orphan"]);

        // Not part of the declared sequence, so the full run skips it
        log.clear();
        lifecycle.execute_all_stages().unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_execute_undeclared_stage_rejected_by_policy() {
        let config =
            LifecycleConfig::new().with_undeclared_stage_policy(UndeclaredStagePolicy::Reject);
        let lifecycle = Lifecycle::with_config(config);
        lifecycle.declare_stages([1, 2]).unwrap();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("1"));
        lifecycle.register(42, log.recorder("42"));

        let err = lifecycle.execute_stages([1, 42]).unwrap_err();
        match err {
            LifecycleError::UndeclaredStage { stage } => assert_eq!(stage, StageId::new(42)),
            other => panic!("unexpected error: {other}"),
        }
        // Validation happens before anything runs
        assert!(log.is_empty());

        lifecycle.execute_stages([2, 1]).unwrap();
        assert_eq!(log.entries(), vec!["1"]);
    }

    #[test]
    fn test_reject_policy_before_declaration() {
        let config =
            LifecycleConfig::new().with_undeclared_stage_policy(UndeclaredStagePolicy::Reject);
        let lifecycle = Lifecycle::with_config(config);

        let err = lifecycle.execute_stages([1]).unwrap_err();
        assert!(matches!(err, LifecycleError::UndeclaredStage { .. }));
    }

    #[test]
    fn test_execute_all_before_declaration() {
        let lifecycle = Lifecycle::new();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("1"));

        let err = lifecycle.execute_all_stages().unwrap_err();
        assert!(matches!(err, LifecycleError::NotDeclared));
        assert!(err.is_fatal());
        assert!(log.is_empty());
    }

    #[test]
    fn test_fallible_callback_aborts_stage_and_run() {
        let lifecycle = Lifecycle::new();
        lifecycle.declare_stages([1, 2]).unwrap();
        let log = CallLog::new();
        lifecycle.register(1, log.recorder("before"));
        lifecycle.register_callback(
            1,
            Callback::fallible(|| anyhow::bail!("connection refused")).with_name("db.connect"),
        );
        lifecycle.register(1, log.recorder("after"));
        lifecycle.register(2, log.recorder("stage2"));

        let err = lifecycle.execute_all_stages().unwrap_err();

        let LifecycleError::CallbackFailed(failure) = err else {
            panic!("expected callback failure");
        };
        assert_eq!(failure.stage, StageId::new(1));
        assert_eq!(failure.index, 1);
        assert_eq!(failure.name.as_deref(), Some("db.connect"));
        assert_eq!(failure.message, "connection refused");
        assert!(!failure.panicked);

        // Earlier side effects stay, later callbacks and stages never run
        assert_eq!(log.entries(), vec!["before"]);
    }

    #[test]
    fn test_panicking_callback_is_reported() {
        let lifecycle = Lifecycle::new();
        lifecycle.register(1, || {
            panic!("Intentional");
        });

        let err = lifecycle.execute_stage(1).unwrap_err();
        let LifecycleError::CallbackFailed(failure) = err else {
            panic!("expected callback failure");
        };
        assert!(failure.panicked);
        assert_eq!(failure.message, "Intentional");
        assert_eq!(lifecycle.state(), LifecycleState::Undeclared);
    }

    #[test]
    fn test_panicking_callback_unwinds_when_not_caught() {
        let lifecycle = Lifecycle::with_config(LifecycleConfig::new().with_catch_panics(false));
        lifecycle.declare_stages([1]).unwrap();
        lifecycle.register(1, || {
            panic!("Intentional");
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = lifecycle.execute_all_stages();
        }));

        assert!(result.is_err());
        // The in-flight guard unwound with the panic
        assert_eq!(lifecycle.state(), LifecycleState::Declared);
    }

    #[test]
    fn test_state_executing_during_run() {
        let lifecycle = Arc::new(Lifecycle::new());
        lifecycle.declare_stages([1]).unwrap();
        let seen = Arc::new(RwLock::new(None));

        let inner = Arc::downgrade(&lifecycle);
        let seen_clone = seen.clone();
        lifecycle.register(1, move || {
            if let Some(lc) = inner.upgrade() {
                *seen_clone.write() = Some(lc.state());
            }
        });

        lifecycle.execute_all_stages().unwrap();

        assert_eq!(*seen.read(), Some(LifecycleState::Executing));
        assert_eq!(lifecycle.state(), LifecycleState::Declared);
    }

    #[test]
    fn test_state_undeclared_during_run_without_declaration() {
        let lifecycle = Arc::new(Lifecycle::new());
        let seen = Arc::new(RwLock::new(None));

        let inner = Arc::downgrade(&lifecycle);
        let seen_clone = seen.clone();
        lifecycle.register(1, move || {
            if let Some(lc) = inner.upgrade() {
                *seen_clone.write() = Some(lc.state());
            }
        });

        lifecycle.execute_stage(1).unwrap();

        assert_eq!(*seen.read(), Some(LifecycleState::Undeclared));
        assert_eq!(lifecycle.state(), LifecycleState::Undeclared);
    }

    #[test]
    fn test_callback_registered_during_execution_runs_next_time() {
        let lifecycle = Arc::new(Lifecycle::new());
        let log = CallLog::new();

        let inner = Arc::downgrade(&lifecycle);
        let late = log.recorder("late");
        let outer_log = log.clone();
        lifecycle.register(1, move || {
            outer_log.push("outer");
            if let Some(lc) = inner.upgrade() {
                if lc.callback_count(1) == 1 {
                    lc.register(1, late.clone());
                }
            }
        });

        lifecycle.execute_stage(1).unwrap();
        assert_eq!(log.entries(), vec!["outer"]);

        lifecycle.execute_stage(1).unwrap();
        assert_eq!(log.entries(), vec!["outer", "outer", "late"]);
    }

    #[test]
    fn test_observer_receives_events() {
        let observer = Arc::new(CollectingObserver::new());
        let lifecycle = Lifecycle::new().with_observer(observer.clone());
        lifecycle.declare_stages([1, 2]).unwrap();
        lifecycle.register(1, || {});
        lifecycle.register(1, || {});

        lifecycle.execute_all_stages().unwrap();

        assert_eq!(
            observer.events(),
            vec![
                ObservedEvent::StageStarted(StageId::new(1), 2),
                ObservedEvent::StageCompleted(StageId::new(1)),
                ObservedEvent::StageStarted(StageId::new(2), 0),
                ObservedEvent::StageCompleted(StageId::new(2)),
                ObservedEvent::RunCompleted(2),
            ]
        );
    }

    #[test]
    fn test_mock_observer_sees_failure_and_no_completion() {
        let mut mock = MockLifecycleObserver::new();
        mock.expect_on_stage_start().times(1).return_const(());
        mock.expect_on_callback_failed()
            .withf(|failure| failure.stage == StageId::new(7) && failure.index == 0)
            .times(1)
            .return_const(());
        mock.expect_on_stage_complete().times(0);
        mock.expect_on_run_complete().times(0);

        let lifecycle = Lifecycle::new().with_observer(Arc::new(mock));
        lifecycle.declare_stages([7, 8]).unwrap();
        lifecycle.register_fallible(7, || Err(anyhow::anyhow!("nope")));

        assert!(lifecycle.execute_all_stages().is_err());
    }

    #[test]
    fn test_debug_output() {
        let lifecycle = Lifecycle::with_config(LifecycleConfig::new().with_name("server"));
        lifecycle.declare_stages([1]).unwrap();
        let debug = format!("{lifecycle:?}");

        assert!(debug.contains("server"));
        assert!(debug.contains("Declared"));
    }
}
