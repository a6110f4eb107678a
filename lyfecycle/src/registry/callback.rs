//! Typed callback handles.

use crate::core::StageId;
use crate::errors::CallbackFailure;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type CallbackFn = dyn Fn() -> anyhow::Result<()> + Send + Sync;

/// A zero-argument unit of work run when its stage executes.
///
/// Infallible closures are wrapped so that every callback is stored with
/// the same signature; a fallible closure's `Err` becomes a
/// [`CallbackFailure`] at execution time.
#[derive(Clone)]
pub struct Callback {
    func: Arc<CallbackFn>,
    name: Option<String>,
}

impl Callback {
    /// Wraps an infallible closure.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move || {
                func();
                Ok(())
            }),
            name: None,
        }
    }

    /// Wraps a closure that may fail.
    pub fn fallible<F>(func: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            name: None,
        }
    }

    /// Attaches a name used in logs and failure reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the callback's name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Runs the callback, translating an error (and, if `catch_panics` is set,
    /// a panic) into a [`CallbackFailure`].
    ///
    /// With `catch_panics` unset a panic unwinds through the caller.
    pub(crate) fn invoke(
        &self,
        stage: StageId,
        index: usize,
        catch_panics: bool,
    ) -> Result<(), CallbackFailure> {
        let outcome = if catch_panics {
            match catch_unwind(AssertUnwindSafe(|| (self.func)())) {
                Ok(result) => result,
                Err(payload) => {
                    return Err(CallbackFailure::panicked(
                        stage,
                        index,
                        self.name.clone(),
                        panic_message(payload.as_ref()),
                    ));
                }
            }
        } else {
            (self.func)()
        };

        outcome.map_err(|err| {
            CallbackFailure::errored(stage, index, self.name.clone(), format!("{err:#}"))
        })
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
