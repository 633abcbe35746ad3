//! Error handling for gcodeprint
//!
//! Playback never panics in steady state. Conditions that stop or skip a
//! run are reported as [`PlaybackError`] values so that callers and tests
//! can observe them:
//! - rejected input on `print`
//! - stale frames stepped after `stop`/`reset`
//! - a move that leaves the tool head without a defined position
//!
//! All error types use `thiserror`.

use thiserror::Error;

/// Playback engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The command list had nothing drawable, or its first drawable
    /// command lacked numeric coordinates. Nothing was changed.
    #[error("Input rejected: {reason}")]
    InputRejected {
        /// Why the input was rejected.
        reason: String,
    },

    /// A step was requested with a frame handle that is no longer current.
    #[error("Stale frame {frame} (current: {current:?})")]
    StaleFrame {
        /// The handle the caller presented.
        frame: u64,
        /// The handle the engine is waiting for, if any.
        current: Option<u64>,
    },

    /// A move left the tool head without a defined position; the run halted.
    #[error("Current point undefined at command {cursor}")]
    UndefinedCurrentPoint {
        /// Index of the drawable command that halted the run.
        cursor: usize,
    },
}

impl PlaybackError {
    /// Create an input-rejected error from a message
    pub fn rejected(reason: impl Into<String>) -> Self {
        PlaybackError::InputRejected {
            reason: reason.into(),
        }
    }
}
