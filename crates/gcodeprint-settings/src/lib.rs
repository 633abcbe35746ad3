//! gcodeprint Settings Crate
//!
//! Playback pacing and SVG output configuration, persisted as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{Config, PlaybackSettings, RenderSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
