use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::session::EngineSettings;

const CONFIG_DIR: &str = "sunbox";
const CONFIG_FILE: &str = "sunbox.json";

/// Environment variable overriding the configured song path.
pub const SONG_ENV: &str = "SUNBOX_SONG";

/// User settings for the Sunbox plug-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunboxConfig {
    #[serde(default = "default_song_path")]
    pub song_path: PathBuf,
    #[serde(default = "default_slot")]
    pub slot: i32,
    #[serde(default = "default_volume")]
    pub volume: i32,
}

fn default_song_path() -> PathBuf {
    PathBuf::from("/tmp/test.sunvox")
}

fn default_slot() -> i32 {
    EngineSettings::DEFAULT_SLOT
}

fn default_volume() -> i32 {
    EngineSettings::UNITY_VOLUME
}

impl Default for SunboxConfig {
    fn default() -> Self {
        Self {
            song_path: default_song_path(),
            slot: default_slot(),
            volume: default_volume(),
        }
    }
}

impl SunboxConfig {
    /// Location of the configuration file in the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the user configuration, falling back to defaults when the file is
    /// missing or malformed, then applies environment overrides.
    pub fn load() -> Self {
        let config = Self::default_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        config.with_env_overrides(std::env::var_os(SONG_ENV).map(PathBuf::from))
    }

    /// Reads `path`, returning defaults if it cannot be used.
    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    fn with_env_overrides(mut self, song: Option<PathBuf>) -> Self {
        if let Some(song) = song.filter(|song| !song.as_os_str().is_empty()) {
            self.song_path = song;
        }
        self
    }

    /// Engine settings for a session running at `sample_rate`.
    pub fn engine_settings(&self, sample_rate: u32) -> EngineSettings {
        EngineSettings {
            sample_rate,
            slot: self.slot,
            volume: self.volume,
        }
    }
}
