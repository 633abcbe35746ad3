//! # gcodeprint
//!
//! Animated layer-by-layer playback of G-code motion programs, rendered as
//! SVG paths.
//!
//! ## Architecture
//!
//! gcodeprint is organized as a workspace with multiple crates:
//!
//! 1. **gcodeprint-core** - Error types, typed event bus, application state
//! 2. **gcodeprint-visualizer** - Motion commands, G-code reader, layer
//!    registry, playback engine and frame driver
//! 3. **gcodeprint-settings** - Playback and render configuration
//! 4. **gcodeprint** - Main binary that wires a playback session together

pub mod session;

pub use gcodeprint_core::{
    AppEvent, AppState, AppStateSnapshot, EventBus, GcodeFileEntry, PlaybackError,
    Topic,
};

pub use gcodeprint_visualizer::{
    CommandSource, GcodePrinter, GcodeReader, MotionCommand, PlaybackExit, PlaybackReport,
    PlaybackSnapshot, PrinterOptions, RotationBridge, SvgScene,
};

pub use gcodeprint_settings::{Config, PlaybackSettings, RenderSettings};

pub use session::PlaybackSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Environment variable naming an optional config file
pub const CONFIG_ENV: &str = "GCODEPRINT_CONFIG";

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
