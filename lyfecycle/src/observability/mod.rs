//! Observability utilities.

mod logging;
mod observer;

pub use logging::init_logging;
pub use observer::{
    CollectingObserver, LifecycleObserver, LoggingObserver, NoOpObserver, ObservedEvent,
};

#[cfg(test)]
pub use observer::MockLifecycleObserver;
