//! Append-only call log for asserting callback order.

use parking_lot::Mutex;
use std::sync::Arc;

/// A shared, append-only log of labels.
///
/// Clones share the same storage, so a log can be handed to any number of
/// callbacks and inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label.
    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    /// Returns a callback that appends `label` each time it runs.
    pub fn recorder(&self, label: impl Into<String>) -> impl Fn() + Clone + Send + Sync + 'static {
        let log = self.clone();
        let label = label.into();
        move || log.push(label.clone())
    }

    /// Returns a copy of the entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns the index of the first occurrence of `label`.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e == label)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_appends() {
        let log = CallLog::new();
        let a = log.recorder("a");
        let b = log.recorder("b");

        a();
        b();
        a();

        assert_eq!(log.entries(), vec!["a", "b", "a"]);
        assert_eq!(log.position("b"), Some(1));
        assert_eq!(log.position("z"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let log = CallLog::new();
        let other = log.clone();
        other.push("x");

        assert_eq!(log.len(), 1);
        log.clear();
        assert!(other.is_empty());
    }
}
