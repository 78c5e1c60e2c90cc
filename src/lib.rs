//! Mirrors Beat Saber's menu, song and pause state to Discord Rich Presence.
//!
//! Game state comes from the DataPuller mod's WebSocket feeds. Every change
//! notification is mapped onto a small state machine in
//! [`presence::PresenceCoordinator`], which publishes through a
//! [`presence::PresenceClient`].

pub mod discord;
pub mod error;
pub mod feed;
pub mod logging;
pub mod presence;
pub mod service;
pub mod settings;

pub use service::PresenceService;
pub use settings::Settings;
