//! Playback and render configuration
//!
//! Stored as TOML or JSON, chosen by file extension. Every section and field
//! has a default, so a file only needs the values it changes.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use gcodeprint_visualizer::{PrinterOptions, MAX_SUBDIVISIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_DIR: &str = "gcodeprint";
const CONFIG_FILE: &str = "config.toml";

/// Playback pacing and interpolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Time spread over the points of one linear move
    pub segment_interval_ms: u64,
    /// Equal parts each linear move is split into
    pub subdivisions: usize,
    /// Period of the frame pump
    pub frame_interval_ms: u64,
    /// Radius of rapid-move markers
    pub marker_radius: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            segment_interval_ms: 8,
            subdivisions: 4,
            frame_interval_ms: 16,
            marker_radius: 0.15,
        }
    }
}

impl PlaybackSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn to_printer_options(&self) -> PrinterOptions {
        PrinterOptions {
            subdivisions: self.subdivisions,
            segment_interval: Duration::from_millis(self.segment_interval_ms),
            marker_radius: self.marker_radius,
        }
    }
}

/// SVG output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            stroke_width: 0.2,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playback: PlaybackSettings,
    pub render: RenderSettings,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location (`<config_dir>/gcodeprint/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::of(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let playback = &self.playback;
        if playback.frame_interval_ms == 0 {
            return Err(ConfigError::out_of_range(
                "playback.frame_interval_ms",
                playback.frame_interval_ms,
            ));
        }
        if !(1..=MAX_SUBDIVISIONS).contains(&playback.subdivisions) {
            return Err(ConfigError::out_of_range(
                "playback.subdivisions",
                playback.subdivisions,
            ));
        }
        if !(playback.marker_radius.is_finite() && playback.marker_radius > 0.0) {
            return Err(ConfigError::out_of_range(
                "playback.marker_radius",
                playback.marker_radius,
            ));
        }

        let render = &self.render;
        for (key, value) in [
            ("render.width", render.width),
            ("render.height", render.height),
            ("render.stroke_width", render.stroke_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
