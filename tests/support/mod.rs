#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use beatsaber_presence::error::PresenceError;
use beatsaber_presence::feed::SongSnapshot;
use beatsaber_presence::presence::{
    Clock, Deferred, DeferredAction, PresenceClient, PresenceMessage,
};

/// Records every accepted message.
pub struct RecordingClient {
    sent: Mutex<Vec<PresenceMessage>>,
    ready: AtomicBool,
    failing: AtomicBool,
    shutdowns: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            shutdowns: AtomicUsize::new(0),
        })
    }

    pub fn sent(&self) -> Vec<PresenceMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> PresenceMessage {
        self.sent().last().cloned().expect("no presence sent")
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresenceClient for RecordingClient {
    fn name(&self) -> &'static str {
        "Recording"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn send(&self, message: &PresenceMessage) -> Result<(), PresenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PresenceError::Discord("pipe broken".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()),
        })
    }

    pub fn advance(&self, secs: i64) {
        *self.now.lock().unwrap() += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Holds scheduled actions until the test fires them.
pub struct ManualDeferred {
    pending: Mutex<Vec<(Duration, DeferredAction)>>,
}

impl ManualDeferred {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    /// Runs every pending action in scheduling order.
    pub fn fire_all(&self) -> usize {
        let actions: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let count = actions.len();
        for (_, action) in actions {
            action();
        }
        count
    }
}

impl Deferred for ManualDeferred {
    fn schedule(&self, delay: Duration, action: DeferredAction) {
        self.pending.lock().unwrap().push((delay, action));
    }
}

pub fn song(in_level: bool, paused: bool) -> SongSnapshot {
    SongSnapshot {
        song_name: "Ghost".to_string(),
        song_author: "Camellia".to_string(),
        difficulty: "Expert".to_string(),
        mapper: "Nolan121405".to_string(),
        cover_image_key: "https://cdn.beatsaver.com/ghost.jpg".to_string(),
        duration_secs: 180.0,
        in_level,
        level_paused: paused,
        ..SongSnapshot::default()
    }
}
