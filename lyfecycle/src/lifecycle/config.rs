//! Lifecycle configuration.

use crate::errors::LifecycleError;
use serde::{Deserialize, Serialize};

/// What the driver does with a stage that is not in the declared sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeclaredStagePolicy {
    /// Run whatever callbacks the stage has.
    #[default]
    Allow,
    /// Refuse the whole execution list before running anything.
    Reject,
}

/// Configuration for a [`Lifecycle`](super::Lifecycle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Label attached to log records.
    #[serde(default = "default_name")]
    pub name: String,
    /// Handling of undeclared stages in explicit execution lists.
    #[serde(default)]
    pub undeclared_stage_policy: UndeclaredStagePolicy,
    /// Convert callback panics into `CallbackFailed` errors.
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,
}

fn default_name() -> String {
    "lifecycle".to_string()
}

fn default_catch_panics() -> bool {
    true
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            undeclared_stage_policy: UndeclaredStagePolicy::default(),
            catch_panics: default_catch_panics(),
        }
    }
}

impl LifecycleConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the undeclared stage policy.
    #[must_use]
    pub fn with_undeclared_stage_policy(mut self, policy: UndeclaredStagePolicy) -> Self {
        self.undeclared_stage_policy = policy;
        self
    }

    /// Sets whether callback panics are caught.
    #[must_use]
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Config`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, LifecycleError> {
        serde_json::from_str(json).map_err(|e| LifecycleError::Config(e.to_string()))
    }
}
