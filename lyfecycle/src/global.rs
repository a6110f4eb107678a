//! Process-wide default lifecycle.
//!
//! Hosts that would rather not thread a [`Lifecycle`] through every module
//! can use these functions, which operate on a single lazily created
//! instance with the default configuration. The instance can never be
//! reset: stages are still declared at most once per process.

use crate::core::{ExecutionReport, StageId, StageReport};
use crate::errors::LifecycleError;
use crate::lifecycle::Lifecycle;
use std::sync::OnceLock;

static GLOBAL_LIFECYCLE: OnceLock<Lifecycle> = OnceLock::new();

/// Gets the process-wide lifecycle.
pub fn lifecycle() -> &'static Lifecycle {
    GLOBAL_LIFECYCLE.get_or_init(Lifecycle::new)
}

/// Declares stages on the process-wide lifecycle.
///
/// # Errors
///
/// See [`Lifecycle::declare_stages`].
pub fn declare_stages<I, S>(stages: I) -> Result<(), LifecycleError>
where
    I: IntoIterator<Item = S>,
    S: Into<StageId>,
{
    lifecycle().declare_stages(stages)
}

/// Returns a copy of the process-wide declared stages.
#[must_use]
pub fn declared_stages() -> Vec<StageId> {
    lifecycle().declared_stages()
}

/// Registers a callback on the process-wide lifecycle.
pub fn register<S, F>(stage: S, callback: F)
where
    S: Into<StageId>,
    F: Fn() + Send + Sync + 'static,
{
    lifecycle().register(stage, callback);
}

/// Registers a fallible callback on the process-wide lifecycle.
pub fn register_fallible<S, F>(stage: S, callback: F)
where
    S: Into<StageId>,
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    lifecycle().register_fallible(stage, callback);
}

/// Runs one stage of the process-wide lifecycle.
///
/// # Errors
///
/// See [`Lifecycle::execute_stage`].
pub fn execute_stage(stage: impl Into<StageId>) -> Result<StageReport, LifecycleError> {
    lifecycle().execute_stage(stage)
}

/// Runs the given stages of the process-wide lifecycle.
///
/// # Errors
///
/// See [`Lifecycle::execute_stages`].
pub fn execute_stages<I, S>(stages: I) -> Result<ExecutionReport, LifecycleError>
where
    I: IntoIterator<Item = S>,
    S: Into<StageId>,
{
    lifecycle().execute_stages(stages)
}

/// Runs every declared stage of the process-wide lifecycle.
///
/// # Errors
///
/// See [`Lifecycle::execute_all_stages`].
pub fn execute_all_stages() -> Result<ExecutionReport, LifecycleError> {
    lifecycle().execute_all_stages()
}
