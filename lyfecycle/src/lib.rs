//! # Lyfecycle
//!
//! Simple application lifecycle management.
//!
//! A host application declares a linear sequence of stages once at startup.
//! The modules and plugins embedded in it register callbacks against those
//! stages as they initialize, in whatever order that happens. Running the
//! lifecycle then executes each stage in declared order, and every callback
//! of a stage in registration order, before moving on to the next stage.
//!
//! - **Set-once declaration**: a second declaration, or a sequence with a
//!   duplicate stage, is rejected without touching the stored stages
//! - **Append-only registry**: callbacks are never removed, so re-running a
//!   stage fires them again
//! - **Sequential driver**: no parallelism within or across stages
//! - **Explicit failures**: callback errors and panics surface as
//!   [`LifecycleError::CallbackFailed`]
//!
//! ## Quick Start
//!
//! ```rust
//! use lyfecycle::prelude::*;
//!
//! const CONFIG: i64 = 1;
//! const SERVE: i64 = 2;
//!
//! let lifecycle = Lifecycle::new();
//! lifecycle.declare_stages([CONFIG, SERVE])?;
//!
//! lifecycle.register(SERVE, || println!("listening"));
//! lifecycle.register(CONFIG, || println!("config loaded"));
//!
//! let report = lifecycle.execute_all_stages()?;
//! assert_eq!(report.callbacks_run(), 2);
//! # Ok::<(), LifecycleError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod errors;
pub mod global;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod testing;

pub use crate::core::{ExecutionReport, LifecycleState, StageId, StageReport, StageSequence};
pub use crate::errors::LifecycleError;
pub use crate::lifecycle::{Lifecycle, LifecycleConfig, UndeclaredStagePolicy};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ExecutionReport, LifecycleState, StageId, StageReport, StageSequence,
    };
    pub use crate::errors::{
        CallbackFailure, DuplicateStageError, ErrorInfo, ErrorKind, LifecycleError,
    };
    pub use crate::lifecycle::{Lifecycle, LifecycleConfig, UndeclaredStagePolicy};
    pub use crate::observability::{
        LifecycleObserver, LoggingObserver, NoOpObserver,
    };
    pub use crate::registry::{Callback, CallbackRegistry};
}
