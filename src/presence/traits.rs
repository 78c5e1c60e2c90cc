use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PresenceError;

/// A single presence update, independent of the service it is shown on.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceMessage {
    pub details: String,
    pub state: String,
    /// Shown as elapsed time since this instant
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Shown as time remaining until this instant
    pub end_timestamp: Option<DateTime<Utc>>,
    pub image_key: String,
    pub image_text: String,
}

/// Trait for presence services (Discord, test recorders, etc.)
#[async_trait]
pub trait PresenceClient: Send + Sync {
    /// Returns the name of this presence client (for logging)
    fn name(&self) -> &'static str;

    /// Whether the client can currently accept updates
    fn is_ready(&self) -> bool;

    /// Hand an update to the client. Must not block on the network.
    fn send(&self, message: &PresenceMessage) -> Result<(), PresenceError>;

    /// Release the connection. Called once at shutdown.
    async fn shutdown(&self);
}
