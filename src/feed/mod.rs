//! Game state feeds published by the DataPuller mod.
//!
//! Each feed exposes the latest snapshot plus a "something changed"
//! notification. Consumers always re-read the snapshot rather than trusting
//! the notification itself.

mod channel;
mod datapuller;
mod snapshot;

pub use channel::{snapshot_feed, FeedPublisher, SnapshotFeed};
pub use datapuller::{endpoint, spawn_feed_connection, LIVE_DATA_PATH, MAP_DATA_PATH};
pub use snapshot::{PlaybackSnapshot, SongSnapshot};
