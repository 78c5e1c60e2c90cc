use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "beatsaber-presence";

/// Discord application registered for Beat Saber presence
pub const DEFAULT_DISCORD_APP_ID: i64 = 1289691163389067325;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub discord_app_id: i64,
    pub data_puller_host: String,
    pub data_puller_port: u16,
    /// Seconds to wait after entering a level before publishing the song
    pub song_settle_delay_secs: u64,
    /// Fixed wait between DataPuller reconnect attempts
    pub reconnect_delay_secs: u64,
    pub log_retention_days: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discord_app_id: DEFAULT_DISCORD_APP_ID,
            data_puller_host: "127.0.0.1".to_string(),
            data_puller_port: 2946,
            song_settle_delay_secs: 3,
            reconnect_delay_secs: 5,
            log_retention_days: 7,
        }
    }
}

pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let dir = dirs::config_dir()
        .ok_or(SettingsError::NoConfigDir)?
        .join(APP_DIR);
    Ok(dir.join(SETTINGS_FILE))
}

/// Loads settings from `path`, falling back to defaults when the file is absent.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    tracing::debug!("Loading settings from {}", path.display());

    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.song_settle_delay_secs, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "data_puller_port": 3000 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.data_puller_port, 3000);
        assert_eq!(settings.discord_app_id, DEFAULT_DISCORD_APP_ID);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_settings(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
