//! Execution reports returned by the stage driver.

use super::StageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of running one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage that ran.
    pub stage: StageId,
    /// Number of callbacks invoked.
    pub callbacks_run: usize,
    /// Wall time spent in the stage, in milliseconds.
    pub duration_ms: f64,
}

impl StageReport {
    /// Creates a stage report.
    #[must_use]
    pub fn new(stage: StageId, callbacks_run: usize, duration_ms: f64) -> Self {
        Self {
            stage,
            callbacks_run,
            duration_ms,
        }
    }

    /// Returns true if the stage had no callbacks.
    #[must_use]
    pub fn was_empty(&self) -> bool {
        self.callbacks_run == 0
    }
}

/// Outcome of running a list of stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Correlation id for this run, also attached to log spans.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-stage reports in execution order.
    pub stages: Vec<StageReport>,
    /// Total wall time in milliseconds.
    pub duration_ms: f64,
}

impl ExecutionReport {
    /// Starts an empty report with a fresh run id.
    #[must_use]
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stages: Vec::new(),
            duration_ms: 0.0,
        }
    }

    /// Returns the stage ids in the order they ran.
    #[must_use]
    pub fn stages_run(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.stage).collect()
    }

    /// Returns the total number of callbacks invoked.
    #[must_use]
    pub fn callbacks_run(&self) -> usize {
        self.stages.iter().map(|s| s.callbacks_run).sum()
    }
}
