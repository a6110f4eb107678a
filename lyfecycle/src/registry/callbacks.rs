//! Stage-to-callbacks registry.

use super::Callback;
use crate::core::StageId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Registry mapping each stage to its callbacks in registration order.
///
/// The registry only grows: callbacks are appended and never removed or
/// reordered. Stages do not need to be declared to receive callbacks.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RwLock<HashMap<StageId, Vec<Callback>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback to `stage`'s list.
    pub fn register(&self, stage: StageId, callback: Callback) {
        let mut callbacks = self.callbacks.write();
        let list = callbacks.entry(stage).or_default();
        debug!(
            stage = %stage,
            index = list.len(),
            name = callback.name().unwrap_or("<unnamed>"),
            "Registered lifecycle callback"
        );
        list.push(callback);
    }

    /// Returns a snapshot of `stage`'s callbacks.
    ///
    /// The lock is released before the snapshot is returned, so callers may
    /// run the callbacks while other threads (or the callbacks themselves)
    /// register more.
    #[must_use]
    pub fn snapshot(&self, stage: StageId) -> Vec<Callback> {
        self.callbacks
            .read()
            .get(&stage)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of callbacks registered for `stage`.
    #[must_use]
    pub fn callback_count(&self, stage: StageId) -> usize {
        self.callbacks.read().get(&stage).map_or(0, Vec::len)
    }

    /// Returns every stage with at least one callback, sorted by id.
    #[must_use]
    pub fn registered_stages(&self) -> Vec<StageId> {
        let mut stages: Vec<StageId> = self.callbacks.read().keys().copied().collect();
        stages.sort_unstable();
        stages
    }

    /// Returns the number of callbacks across all stages.
    #[must_use]
    pub fn total_callbacks(&self) -> usize {
        self.callbacks.read().values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // One guard for both counts: a second read on this thread can block
        // behind a queued writer.
        let callbacks = self.callbacks.read();
        f.debug_struct("CallbackRegistry")
            .field("stage_count", &callbacks.len())
            .field("callback_count", &callbacks.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
