//! One-shot delayed actions.

use std::time::Duration;

use tokio::runtime::Handle;

pub type DeferredAction = Box<dyn FnOnce() + Send + 'static>;

/// Runs an action once after a delay without blocking the caller.
///
/// Scheduled actions cannot be cancelled; they always run once the delay elapses.
pub trait Deferred: Send + Sync {
    fn schedule(&self, delay: Duration, action: DeferredAction);
}

/// Schedules actions as detached tokio tasks.
#[derive(Debug, Clone)]
pub struct TokioDeferred {
    handle: Handle,
}

impl TokioDeferred {
    /// Binds to the runtime of the calling task. Panics outside a tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }
}

impl Deferred for TokioDeferred {
    fn schedule(&self, delay: Duration, action: DeferredAction) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
    }
}
