//! Testing utilities for lifecycle callbacks.

mod call_log;

pub use call_log::CallLog;
