//! # Playback
//!
//! - [`layers`]: one accumulating path per z height
//! - [`engine`]: the step-driven [`GcodePrinter`] state machine
//! - [`driver`]: async frame pacing around a shared printer
//! - [`bridge`]: applies bus rotations to the active layer

pub mod bridge;
pub mod driver;
pub mod engine;
pub mod layers;

pub use bridge::RotationBridge;
pub use driver::{
    run_playback, shared_printer, FramePump, FrameTick, IntervalFramePump, ManualFramePump,
    ManualFrameTrigger, PlaybackExit, PlaybackReport, SharedPrinter,
};
pub use engine::{
    Cursor, FrameHandle, GcodePrinter, LayerSnapshot, PlaybackPhase, PlaybackSnapshot,
    PrinterOptions, StepOutcome, RAPID_MARKER_CLASS,
};
pub use layers::{Layer, LayerId, LayerRegistry};
