//! # gcodeprint Visualizer
//!
//! Layer-by-layer playback of G-code motion programs onto a 2D vector
//! surface. Includes the motion command model, a line reader, the layer
//! registry, the step-driven playback engine and its async driver.

pub mod gcode;
pub mod geometry;
pub mod printer;
pub mod render;

pub use geometry::{
    points_between, points_between_with, Point, DEFAULT_SUBDIVISIONS, MAX_SUBDIVISIONS,
};

pub use gcode::{drawable_commands, CommandKind, CommandSource, GcodeReader, MotionCommand};

pub use printer::{
    run_playback, shared_printer, Cursor, FrameHandle, FramePump, FrameTick, GcodePrinter,
    IntervalFramePump, LayerId, LayerRegistry, LayerSnapshot, ManualFramePump, ManualFrameTrigger,
    PlaybackExit, PlaybackPhase, PlaybackReport, PlaybackSnapshot, PrinterOptions, RotationBridge,
    SharedPrinter, StepOutcome, RAPID_MARKER_CLASS,
};

pub use render::{NodeId, RenderSurface, SvgNode, SvgScene};
