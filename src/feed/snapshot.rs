use serde::{Deserialize, Deserializer};

/// Live playback data (`/BSDataPuller/LiveData`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackSnapshot {
    /// Only some DataPuller builds report level flags on the live feed; the
    /// map feed is authoritative for them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_level: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level_paused: bool,
    /// Seconds into the current map
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_elapsed: f64,
}

/// Map/song data (`/BSDataPuller/MapData`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SongSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub song_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub song_sub_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub song_author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mapper: String,
    #[serde(default, rename = "CoverImage", deserialize_with = "null_as_default")]
    pub cover_image_key: String,
    #[serde(default, rename = "Duration", deserialize_with = "null_as_default")]
    pub duration_secs: f64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, rename = "BSRKey")]
    pub bsr_key: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_level: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level_paused: bool,
}

impl SongSnapshot {
    /// Seconds left in the map given the elapsed time from the live feed.
    pub fn remaining_secs(&self, playback: &PlaybackSnapshot) -> f64 {
        self.duration_secs - playback.time_elapsed
    }
}

// DataPuller sends explicit nulls for most fields while in the menu.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_map_data_in_level() {
        let json = r#"{
            "GameVersion": "1.37.0",
            "InLevel": true,
            "LevelPaused": false,
            "Hash": "A1B2C3",
            "SongName": "Reality Check Through The Skull",
            "SongSubName": "",
            "SongAuthor": "DM DOKURO",
            "Mapper": "Teuflum",
            "BSRKey": "1a2b",
            "CoverImage": "https://cdn.beatsaver.com/a1b2c3.jpg",
            "Duration": 265,
            "Difficulty": "ExpertPlus",
            "BPM": 200
        }"#;

        let song: SongSnapshot = serde_json::from_str(json).unwrap();
        assert!(song.in_level);
        assert!(!song.level_paused);
        assert_eq!(song.song_name, "Reality Check Through The Skull");
        assert_eq!(song.cover_image_key, "https://cdn.beatsaver.com/a1b2c3.jpg");
        assert_eq!(song.duration_secs, 265.0);
        assert_eq!(song.bsr_key.as_deref(), Some("1a2b"));
    }

    #[test]
    fn test_parse_map_data_menu_nulls() {
        let json = r#"{
            "InLevel": false,
            "LevelPaused": false,
            "SongName": null,
            "SongAuthor": null,
            "CoverImage": null,
            "Duration": 0,
            "Hash": null
        }"#;

        let song: SongSnapshot = serde_json::from_str(json).unwrap();
        assert!(!song.in_level);
        assert_eq!(song.song_name, "");
        assert_eq!(song.hash, None);
    }

    #[test]
    fn test_parse_live_data() {
        let json = r#"{ "Score": 1000, "TimeElapsed": 42, "EventTrigger": 1 }"#;

        let live: PlaybackSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(live.time_elapsed, 42.0);
        assert!(!live.in_level);
    }

    #[test]
    fn test_remaining_secs() {
        let song = SongSnapshot {
            duration_secs: 180.0,
            ..SongSnapshot::default()
        };
        let live = PlaybackSnapshot {
            time_elapsed: 30.5,
            ..PlaybackSnapshot::default()
        };
        assert_eq!(song.remaining_secs(&live), 149.5);
    }
}
