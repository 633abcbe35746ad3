//! # gcodeprint Core
//!
//! Core types shared by the gcodeprint crates:
//! - the error taxonomy used by playback and the host application
//! - a typed event bus with a fixed set of topics
//! - the application state store that publishes onto that bus

pub mod error;
pub mod event_bus;
pub mod state;

pub use error::PlaybackError;

pub use event_bus::{AppEvent, EventBus, EventBusError, EventFilter, SubscriptionId, Topic};

pub use state::{AppState, AppStateSnapshot, GcodeFileEntry};
