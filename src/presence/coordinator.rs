//! Maps game state transitions onto presence updates

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use super::clock::Clock;
use super::deferred::Deferred;
use super::message::MAIN_MENU;
use super::traits::{PresenceClient, PresenceMessage};
use crate::feed::{PlaybackSnapshot, SnapshotFeed, SongSnapshot};

/// What the player is currently doing, as last reported to the presence service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Menu,
    Playing,
    Paused,
}

/// The presence update a notification resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    EnteredLevel,
    LeftLevel,
    Paused,
    Resumed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorState {
    pub is_in_level: bool,
    pub is_paused: bool,
    /// Only meaningful while in a level
    pub remaining_time_secs: f64,
    pub last_song_name: Option<String>,
    pub last_difficulty: Option<String>,
}

impl CoordinatorState {
    /// Applies at most one transition. Rules are checked in order and the
    /// first match wins, so leaving a level beats any pause change.
    pub fn apply(&mut self, currently_in_level: bool, level_paused: bool) -> Option<Transition> {
        if currently_in_level && !self.is_in_level {
            self.is_in_level = true;
            Some(Transition::EnteredLevel)
        } else if !currently_in_level && self.is_in_level {
            self.is_in_level = false;
            Some(Transition::LeftLevel)
        } else if level_paused && !self.is_paused {
            self.is_paused = true;
            Some(Transition::Paused)
        } else if !level_paused && self.is_paused {
            self.is_paused = false;
            Some(Transition::Resumed)
        } else {
            None
        }
    }

    pub fn status(&self) -> PresenceStatus {
        match (self.is_in_level, self.is_paused) {
            (false, _) => PresenceStatus::Menu,
            (true, true) => PresenceStatus::Paused,
            (true, false) => PresenceStatus::Playing,
        }
    }
}

/// Owns the coordinator state and the presence client for the lifetime of the service
pub struct PresenceCoordinator {
    state: CoordinatorState,
    client: Option<Arc<dyn PresenceClient>>,
    live: SnapshotFeed<PlaybackSnapshot>,
    map: SnapshotFeed<SongSnapshot>,
    clock: Arc<dyn Clock>,
    deferred: Arc<dyn Deferred>,
    settle_delay: Duration,
}

impl PresenceCoordinator {
    pub fn new(
        client: Option<Arc<dyn PresenceClient>>,
        live: SnapshotFeed<PlaybackSnapshot>,
        map: SnapshotFeed<SongSnapshot>,
        clock: Arc<dyn Clock>,
        deferred: Arc<dyn Deferred>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            state: CoordinatorState::default(),
            client,
            live,
            map,
            clock,
            deferred,
            settle_delay,
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn status(&self) -> PresenceStatus {
        self.state.status()
    }

    /// Re-reads both feeds and publishes whatever transition they imply.
    pub fn on_notification(&mut self) -> Option<Transition> {
        let song = self.map.latest();
        let live = self.live.latest();

        let transition = self.state.apply(song.in_level, song.level_paused)?;
        tracing::debug!("Presence transition: {:?}", transition);

        match transition {
            Transition::EnteredLevel => self.show_song(&song, &live),
            Transition::LeftLevel => self.show_menu(MAIN_MENU),
            Transition::Paused => self.show_paused(&song, &live),
            Transition::Resumed => self.show_resumed(&song),
        }

        Some(transition)
    }

    pub fn show_menu(&self, label: &str) {
        let message = PresenceMessage::menu(label, self.clock.now());
        if send_guarded(self.client.as_deref(), &message) {
            tracing::info!("Presence updated: {}", label);
        }
    }

    /// Publishes the song after the settle delay. The end time is fixed now;
    /// song metadata is re-read when the delay elapses.
    fn show_song(&mut self, song: &SongSnapshot, live: &PlaybackSnapshot) {
        self.state.last_song_name = Some(song.song_name.clone());
        self.state.last_difficulty = Some(song.difficulty.clone());
        self.state.remaining_time_secs = song.remaining_secs(live);

        let end = match end_after(self.clock.now(), self.state.remaining_time_secs) {
            Some(end) => end,
            None => {
                tracing::warn!(
                    "Remaining time {}s for {} is out of range, skipping update",
                    self.state.remaining_time_secs,
                    song.song_name
                );
                return;
            }
        };

        tracing::info!(
            "Entered level {} ({}), publishing in {:?}",
            song.song_name,
            song.difficulty,
            self.settle_delay
        );

        let client = self.client.clone();
        let map = self.map.clone();
        self.deferred.schedule(
            self.settle_delay,
            Box::new(move || {
                let song = map.latest();
                let message = PresenceMessage::song(&song, end);
                if send_guarded(client.as_deref(), &message) {
                    tracing::info!(
                        "Presence updated: Details = {}, State = {}, EndTime = {}",
                        message.details,
                        message.state,
                        end
                    );
                }
            }),
        );
    }

    fn show_paused(&mut self, song: &SongSnapshot, live: &PlaybackSnapshot) {
        self.state.remaining_time_secs = song.remaining_secs(live);

        let message = PresenceMessage::paused(song);
        if send_guarded(self.client.as_deref(), &message) {
            tracing::info!(
                "Paused presence updated: Details = {}, remaining {:.0}s",
                message.details,
                self.state.remaining_time_secs
            );
        }
    }

    fn show_resumed(&self, song: &SongSnapshot) {
        if !song.in_level {
            tracing::debug!("Resume observed outside a level, not updating presence");
            return;
        }

        let end = match end_after(self.clock.now(), self.state.remaining_time_secs) {
            Some(end) => end,
            None => {
                tracing::warn!(
                    "Remaining time {}s for {} is out of range, skipping update",
                    self.state.remaining_time_secs,
                    song.song_name
                );
                return;
            }
        };
        let message = PresenceMessage::song(song, end);
        if send_guarded(self.client.as_deref(), &message) {
            tracing::info!("Resumed presence updated: EndTime = {}", end);
        }
    }

    /// Hands the client back for release at shutdown.
    pub fn take_client(&mut self) -> Option<Arc<dyn PresenceClient>> {
        self.client.take()
    }
}

/// Sends `message` if the client exists and is ready. Returns whether it was accepted.
fn send_guarded(client: Option<&dyn PresenceClient>, message: &PresenceMessage) -> bool {
    let client = match client {
        Some(client) if client.is_ready() => client,
        _ => {
            tracing::warn!("Presence client is not initialized, skipping update");
            return false;
        }
    };

    match client.send(message) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                "Failed to send {} presence '{}': {}",
                client.name(),
                message.details,
                e
            );
            false
        }
    }
}

/// `now + secs`, or `None` when the offset is not finite or leaves chrono's range.
fn end_after(now: DateTime<Utc>, secs: f64) -> Option<DateTime<Utc>> {
    now.checked_add_signed(seconds(secs)?)
}

fn seconds(secs: f64) -> Option<TimeDelta> {
    let millis = (secs * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_rules() {
        // (in_level, paused, cached in_level, cached paused) -> expected
        let cases = [
            ((true, false), (false, false), Some(Transition::EnteredLevel)),
            ((true, true), (false, false), Some(Transition::EnteredLevel)),
            ((false, false), (true, false), Some(Transition::LeftLevel)),
            ((false, true), (true, true), Some(Transition::LeftLevel)),
            ((true, true), (true, false), Some(Transition::Paused)),
            ((true, false), (true, true), Some(Transition::Resumed)),
            ((true, false), (true, false), None),
            ((true, true), (true, true), None),
            ((false, false), (false, false), None),
        ];

        for ((in_level, paused), (was_in_level, was_paused), expected) in cases {
            let mut state = CoordinatorState {
                is_in_level: was_in_level,
                is_paused: was_paused,
                ..CoordinatorState::default()
            };
            assert_eq!(
                state.apply(in_level, paused),
                expected,
                "snapshot ({}, {}) from cached ({}, {})",
                in_level,
                paused,
                was_in_level,
                was_paused
            );
        }
    }

    #[test]
    fn test_entering_level_keeps_stale_pause_flag() {
        let mut state = CoordinatorState {
            is_paused: true,
            ..CoordinatorState::default()
        };

        assert_eq!(state.apply(true, false), Some(Transition::EnteredLevel));
        assert!(state.is_paused);
        assert_eq!(state.apply(true, false), Some(Transition::Resumed));
        assert_eq!(state.status(), PresenceStatus::Playing);
    }

    #[test]
    fn test_identical_snapshot_is_idempotent() {
        let mut state = CoordinatorState::default();
        assert_eq!(state.apply(true, false), Some(Transition::EnteredLevel));
        assert_eq!(state.apply(true, false), None);

        assert_eq!(state.apply(true, true), Some(Transition::Paused));
        assert_eq!(state.apply(true, true), None);
    }

    #[test]
    fn test_status_from_flags() {
        let mut state = CoordinatorState::default();
        assert_eq!(state.status(), PresenceStatus::Menu);

        state.apply(true, false);
        assert_eq!(state.status(), PresenceStatus::Playing);

        state.apply(true, true);
        assert_eq!(state.status(), PresenceStatus::Paused);

        state.apply(false, true);
        assert_eq!(state.status(), PresenceStatus::Menu);
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(seconds(1.5), Some(TimeDelta::milliseconds(1500)));
        assert_eq!(seconds(-2.0), Some(TimeDelta::seconds(-2)));
    }

    #[test]
    fn test_out_of_range_offsets() {
        let now = Utc::now();
        assert_eq!(seconds(f64::NAN), None);
        assert_eq!(seconds(f64::INFINITY), None);
        assert_eq!(seconds(1e300), None);
        assert_eq!(end_after(now, 1e13), None);
        assert_eq!(end_after(now, -1e13), None);
        assert_eq!(end_after(now, 60.0), Some(now + TimeDelta::seconds(60)));
    }
}
