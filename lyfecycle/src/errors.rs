//! Error types for the lyfecycle crate.
//!
//! Errors fall into three families:
//!
//! - **protocol misuse**: the host called the API out of order (declaring
//!   twice, running the full lifecycle before declaring). These are
//!   programming errors and callers are expected to treat them as fatal.
//! - **validation**: a stage list was rejected before anything was stored
//!   or run.
//! - **callback failure**: a registered callback returned an error or
//!   panicked while its stage was executing.

use crate::core::StageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Stages were declared a second time.
    #[error("stages already declared ({} stages); declaration is set once and never again", .existing.len())]
    AlreadyDeclared {
        /// The sequence that was declared first and remains in effect.
        existing: Vec<StageId>,
    },

    /// The full lifecycle was requested before any declaration.
    #[error("cannot execute all stages before stages are declared")]
    NotDeclared,

    /// A declared sequence contained the same stage twice.
    #[error("{0}")]
    DuplicateStage(#[from] DuplicateStageError),

    /// An execution list named a stage outside the declared sequence.
    #[error("stage {stage} is not part of the declared stage sequence")]
    UndeclaredStage {
        /// The offending stage.
        stage: StageId,
    },

    /// A callback failed while its stage was executing.
    #[error("{0}")]
    CallbackFailed(#[from] CallbackFailure),

    /// Configuration could not be parsed.
    #[error("invalid lifecycle configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`LifecycleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The API was called out of order.
    ProtocolMisuse,
    /// Input was rejected before any state changed.
    Validation,
    /// A callback failed during execution.
    CallbackFailure,
    /// Configuration was malformed.
    Config,
}

impl LifecycleError {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyDeclared { .. } => codes::ALREADY_DECLARED,
            Self::NotDeclared => codes::NOT_DECLARED,
            Self::DuplicateStage(_) => codes::DUPLICATE_STAGE,
            Self::UndeclaredStage { .. } => codes::UNDECLARED_STAGE,
            Self::CallbackFailed(_) => codes::CALLBACK_FAILED,
            Self::Config(_) => codes::CONFIG,
        }
    }

    /// Returns the error family.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyDeclared { .. } | Self::NotDeclared => ErrorKind::ProtocolMisuse,
            Self::DuplicateStage(_) | Self::UndeclaredStage { .. } => ErrorKind::Validation,
            Self::CallbackFailed(_) => ErrorKind::CallbackFailure,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns true for programming errors the host should not try to recover from.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::ProtocolMisuse | ErrorKind::Validation)
    }

    /// Builds a diagnostic record for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let mut info = ErrorInfo::new(self.code(), self.to_string());
        if let Some(hint) = ErrorSuggestions::get(self.code()) {
            info = info.with_fix_hint(hint);
        }

        match self {
            Self::AlreadyDeclared { existing } => info.with_context_entry(
                "existing",
                existing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::DuplicateStage(err) => info
                .with_context_entry("stage", err.stage.to_string())
                .with_context_entry("first_position", err.first_position.to_string())
                .with_context_entry("duplicate_position", err.duplicate_position.to_string()),
            Self::UndeclaredStage { stage } => info.with_context_entry("stage", stage.to_string()),
            Self::CallbackFailed(failure) => info
                .with_context_entry("stage", failure.stage.to_string())
                .with_context_entry("callback_index", failure.index.to_string())
                .with_context_entry("callback_name", failure.display_name())
                .with_context_entry("panicked", failure.panicked.to_string()),
            Self::NotDeclared | Self::Config(_) => info,
        }
    }
}

/// Stable error codes.
pub mod codes {
    /// Stages declared twice.
    pub const ALREADY_DECLARED: &str = "LIFECYCLE-001-ALREADY_DECLARED";
    /// Full lifecycle run before declaration.
    pub const NOT_DECLARED: &str = "LIFECYCLE-002-NOT_DECLARED";
    /// Duplicate id in a declared sequence.
    pub const DUPLICATE_STAGE: &str = "LIFECYCLE-003-DUPLICATE_STAGE";
    /// Undeclared id in an execution list.
    pub const UNDECLARED_STAGE: &str = "LIFECYCLE-004-UNDECLARED_STAGE";
    /// A callback failed.
    pub const CALLBACK_FAILED: &str = "LIFECYCLE-005-CALLBACK_FAILED";
    /// Malformed configuration.
    pub const CONFIG: &str = "LIFECYCLE-006-CONFIG";
}

/// Diagnostic record describing an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "LIFECYCLE-003-DUPLICATE_STAGE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON value, omitting an unset hint and empty context.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Raised when a stage sequence repeats a stage id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stage {stage} appears more than once in the stage sequence (positions {first_position} and {duplicate_position})")]
pub struct DuplicateStageError {
    /// The repeated stage.
    pub stage: StageId,
    /// Where the stage first appeared.
    pub first_position: usize,
    /// Where it appeared again.
    pub duplicate_position: usize,
}

impl DuplicateStageError {
    /// Creates a new duplicate stage error.
    #[must_use]
    pub fn new(stage: StageId, first_position: usize, duplicate_position: usize) -> Self {
        Self {
            stage,
            first_position,
            duplicate_position,
        }
    }
}

/// Raised when a callback fails during stage execution.
#[derive(Debug, Clone, Error)]
#[error("callback {} (#{index}) for stage {stage} failed: {message}", .name.as_deref().unwrap_or("<unnamed>"))]
pub struct CallbackFailure {
    /// The stage being executed.
    pub stage: StageId,
    /// Registration index of the callback within its stage.
    pub index: usize,
    /// The callback's name, if it was registered with one.
    pub name: Option<String>,
    /// The error or panic message.
    pub message: String,
    /// True if the callback panicked rather than returning an error.
    pub panicked: bool,
}

impl CallbackFailure {
    /// Creates a failure for a callback that returned an error.
    #[must_use]
    pub fn errored(
        stage: StageId,
        index: usize,
        name: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            index,
            name,
            message: message.into(),
            panicked: false,
        }
    }

    /// Creates a failure for a callback that panicked.
    #[must_use]
    pub fn panicked(
        stage: StageId,
        index: usize,
        name: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            index,
            name,
            message: message.into(),
            panicked: true,
        }
    }

    /// Returns the callback name, or `<unnamed>`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// Provides default suggestions for lifecycle error codes.
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            codes::ALREADY_DECLARED => Some(
                "Declare stages exactly once, from the host application's startup path. \
                 Modules should only register callbacks.",
            ),
            codes::NOT_DECLARED => Some(
                "Call declare_stages() before execute_all_stages(), or use execute_stages() \
                 with an explicit list.",
            ),
            codes::DUPLICATE_STAGE => Some(
                "Give every stage a unique id. An enum with explicit discriminants works well.",
            ),
            codes::UNDECLARED_STAGE => Some(
                "Add the stage to the declared sequence, or switch the undeclared stage policy \
                 to allow.",
            ),
            codes::CALLBACK_FAILED => Some(
                "Inspect the callback named in the error. Callbacks that already ran are not \
                 rolled back.",
            ),
            _ => None,
        }
    }
}
