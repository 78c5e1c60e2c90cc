//! Error types shared across the crate.

use std::path::PathBuf;

/// Failures of the outbound presence client.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("presence client has been shut down")]
    Closed,

    #[error("Discord handshake timed out after {0}s")]
    HandshakeTimeout(u64),

    #[error("Discord: {0}")]
    Discord(String),
}

/// Failures while loading or saving `settings.json`.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while building a DataPuller endpoint address.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid DataPuller address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("feed publisher was dropped")]
    Closed,
}
