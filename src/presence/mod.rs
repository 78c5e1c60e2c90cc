mod clock;
mod coordinator;
mod deferred;
mod message;
mod traits;

pub use clock::{Clock, SystemClock};
pub use coordinator::{CoordinatorState, PresenceCoordinator, PresenceStatus, Transition};
pub use deferred::{Deferred, DeferredAction, TokioDeferred};
pub use message::MAIN_MENU;
pub use traits::{PresenceClient, PresenceMessage};
