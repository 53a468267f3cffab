//! Persisted engine settings: audio volumes, window geometry, and frame pacing.
//!
//! Stored as a flat `key = value` text file, one setting per line, matching the
//! shader preamble grammar in [`crate::resource::pipeline`]. Unknown keys are
//! ignored on read so older settings files keep loading after new fields are added.

use std::path::Path;
use crate::error::{Error, Result};

/// Engine-wide tunables that outlive a single process run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub channel_count: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub target_frametime: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            channel_count: 2,
            window_width: 1280,
            window_height: 720,
            fullscreen: false,
            target_frametime: 1.0 / 60.0,
        }
    }
}

impl Settings {
    /// Parse a `key = value` settings file. Missing fields fall back to
    /// [`Default`]; malformed lines (no `=`) are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidConfig(format!("failed to read settings file '{}': {}", path.as_ref().display(), e))
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse settings from an in-memory `key = value` string.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "master_volume" => settings.master_volume = value.parse().unwrap_or(settings.master_volume),
                "music_volume" => settings.music_volume = value.parse().unwrap_or(settings.music_volume),
                "sfx_volume" => settings.sfx_volume = value.parse().unwrap_or(settings.sfx_volume),
                "channel_count" => settings.channel_count = value.parse().unwrap_or(settings.channel_count),
                "window_width" => settings.window_width = value.parse().unwrap_or(settings.window_width),
                "window_height" => settings.window_height = value.parse().unwrap_or(settings.window_height),
                "fullscreen" => settings.fullscreen = value.parse().unwrap_or(settings.fullscreen),
                "target_frametime" => settings.target_frametime = value.parse().unwrap_or(settings.target_frametime),
                _ => {}
            }
        }

        settings
    }

    /// Serialize to the `key = value` text format `load`/`parse` understand.
    pub fn to_text(&self) -> String {
        format!(
            "master_volume = {}\nmusic_volume = {}\nsfx_volume = {}\nchannel_count = {}\nwindow_width = {}\nwindow_height = {}\nfullscreen = {}\ntarget_frametime = {}\n",
            self.master_volume, self.music_volume, self.sfx_volume, self.channel_count,
            self.window_width, self.window_height, self.fullscreen, self.target_frametime,
        )
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_text()).map_err(|e| {
            Error::InvalidConfig(format!("failed to write settings file '{}': {}", path.as_ref().display(), e))
        })
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
