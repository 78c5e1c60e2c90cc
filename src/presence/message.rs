//! Builders for the four presence updates.

use chrono::{DateTime, Utc};

use super::traits::PresenceMessage;
use crate::feed::SongSnapshot;

pub const MAIN_MENU: &str = "Main Menu";

const MENU_DETAILS: &str = "Playing Beat Saber";
const MENU_IMAGE_KEY: &str = "beat_saber";
const MENU_IMAGE_TEXT: &str = "Browsing the Menu";

impl PresenceMessage {
    /// Menu presence. `now` marks the start of an open-ended session.
    pub fn menu(label: &str, now: DateTime<Utc>) -> Self {
        Self {
            details: MENU_DETAILS.to_string(),
            state: label.to_string(),
            start_timestamp: Some(now),
            end_timestamp: None,
            image_key: MENU_IMAGE_KEY.to_string(),
            image_text: MENU_IMAGE_TEXT.to_string(),
        }
    }

    /// Song presence counting down to `end`. Also used when resuming.
    pub fn song(song: &SongSnapshot, end: DateTime<Utc>) -> Self {
        Self {
            details: song_details(song),
            state: song_state(song),
            start_timestamp: None,
            end_timestamp: Some(end),
            image_key: song.cover_image_key.clone(),
            image_text: song.song_name.clone(),
        }
    }

    pub fn paused(song: &SongSnapshot) -> Self {
        Self {
            details: format!("(Level Is Paused) {}", song_details(song)),
            state: song_state(song),
            start_timestamp: None,
            end_timestamp: None,
            image_key: song.cover_image_key.clone(),
            image_text: song.song_name.clone(),
        }
    }
}

fn song_details(song: &SongSnapshot) -> String {
    format!("{} by {}", song.song_name, song.song_author)
}

fn song_state(song: &SongSnapshot) -> String {
    format!("{} - Mapped by {}", song.difficulty, song.mapper)
}
