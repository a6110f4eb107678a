//! Callback registration.
//!
//! This module provides:
//! - `Callback`, a typed zero-argument unit of work
//! - `CallbackRegistry`, the append-only stage-to-callbacks map

mod callback;
mod callbacks;

pub use callback::Callback;
pub use callbacks::CallbackRegistry;
