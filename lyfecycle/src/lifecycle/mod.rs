//! Lifecycle declaration and execution.
//!
//! This module provides:
//! - `Lifecycle`, the set-once stage guard, callback registry and driver
//! - `LifecycleConfig` and the undeclared stage policy

mod config;
mod coordinator;

pub use config::{LifecycleConfig, UndeclaredStagePolicy};
pub use coordinator::Lifecycle;
