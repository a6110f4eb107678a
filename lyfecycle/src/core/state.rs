//! Lifecycle state reported for diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a lifecycle is in its `Undeclared -> Declared -> Executing` progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No stage sequence has been declared yet.
    Undeclared,
    /// Stages are declared and nothing is running.
    Declared,
    /// At least one execution call is in flight.
    Executing,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undeclared => write!(f, "undeclared"),
            Self::Declared => write!(f, "declared"),
            Self::Executing => write!(f, "executing"),
        }
    }
}

impl LifecycleState {
    /// Returns true once a stage sequence has been declared.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        !matches!(self, Self::Undeclared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::Undeclared.to_string(), "undeclared");
        assert_eq!(LifecycleState::Declared.to_string(), "declared");
        assert_eq!(LifecycleState::Executing.to_string(), "executing");
    }

    #[test]
    fn test_state_is_declared() {
        assert!(!LifecycleState::Undeclared.is_declared());
        assert!(LifecycleState::Declared.is_declared());
        assert!(LifecycleState::Executing.is_declared());
    }

    #[test]
    fn test_state_serialize() {
        let json = serde_json::to_string(&LifecycleState::Executing).unwrap();
        assert_eq!(json, r#""executing""#);
    }
}
