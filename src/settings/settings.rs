// Settings management and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::audio::output::DEFAULT_FRAMES_PER_BUFFER;
use crate::audio::PlayerOptions;
use crate::error::{PlayerError, Result};

/// Playback settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Frames per callback; None lets the device choose
    pub frames_per_buffer: Option<u32>,
    /// Wrap to the first frame inside the same callback period when looping
    pub gapless_loop: bool,
    pub loop_by_default: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            frames_per_buffer: Some(DEFAULT_FRAMES_PER_BUFFER),
            gapless_loop: true,
            loop_by_default: false,
        }
    }
}

/// Output device settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Device name; None = default output device
    pub device: Option<String>,
}

/// Main player settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub version: i32, // Settings schema version for future migrations
    pub playback: PlaybackSettings,
    pub output: OutputSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: 1,
            playback: PlaybackSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl PlayerSettings {
    /// Get the settings file path
    pub fn get_settings_path(dir: &Path) -> PathBuf {
        dir.join("settings.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(dir);

        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| PlayerError::Settings(format!("Failed to read settings file: {}", e)))?;

        let settings: PlayerSettings = serde_json::from_str(&content)
            .map_err(|e| PlayerError::Settings(format!("Failed to parse settings: {}", e)))?;

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let path = Self::get_settings_path(dir);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PlayerError::Settings(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&path, content)?;

        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Stream options for a player built from these settings
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            frames_per_buffer: self.playback.frames_per_buffer,
            gapless_loop: self.playback.gapless_loop,
            device: self.output.device.clone(),
        }
    }
}
