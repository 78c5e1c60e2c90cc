use tokio::sync::watch;

use crate::error::FeedError;

/// Read side of a feed: latest snapshot plus change notification.
#[derive(Debug, Clone)]
pub struct SnapshotFeed<T> {
    rx: watch::Receiver<T>,
}

/// Write side of a feed, owned by whatever produces snapshots.
#[derive(Debug)]
pub struct FeedPublisher<T> {
    tx: watch::Sender<T>,
}

/// Creates a feed seeded with `T::default()`.
pub fn snapshot_feed<T: Default>() -> (FeedPublisher<T>, SnapshotFeed<T>) {
    let (tx, rx) = watch::channel(T::default());
    (FeedPublisher { tx }, SnapshotFeed { rx })
}

impl<T: Clone> SnapshotFeed<T> {
    pub fn latest(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits until a snapshot newer than the last one seen by this handle is published.
    pub async fn changed(&mut self) -> Result<(), FeedError> {
        self.rx.changed().await.map_err(|_| FeedError::Closed)
    }
}

impl<T> FeedPublisher<T> {
    /// Stores the snapshot and notifies subscribers. Never fails, even with no subscribers.
    pub fn publish(&self, snapshot: T) {
        self.tx.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> SnapshotFeed<T> {
        SnapshotFeed {
            rx: self.tx.subscribe(),
        }
    }
}
