//! Core types: stage identifiers, sequences, lifecycle state and reports.

mod report;
mod stage_id;
mod state;

pub use report::{ExecutionReport, StageReport};
pub use stage_id::{StageId, StageSequence};
pub use state::LifecycleState;
