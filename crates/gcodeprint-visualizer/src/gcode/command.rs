//! Motion command model consumed by the playback engine

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Kind of motion instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Non-drawing positioning move (G0)
    Rapid,
    /// Drawing move (G1)
    Linear,
    /// Anything else
    Other,
}

impl CommandKind {
    /// Map a G-code number to a command kind
    pub fn from_gcode(number: u32) -> Self {
        match number {
            0 => Self::Rapid,
            1 => Self::Linear,
            _ => Self::Other,
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(self, Self::Rapid | Self::Linear)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rapid => write!(f, "G0"),
            Self::Linear => write!(f, "G1"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One normalized motion instruction
///
/// Axis words absent from the source line are `None`; the engine never
/// fills them in from earlier commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub kind: CommandKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
}

impl MotionCommand {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            z: None,
            e: None,
            f: None,
        }
    }

    /// Rapid move to `(x, y)`
    pub fn rapid(x: f64, y: f64) -> Self {
        Self::new(CommandKind::Rapid).with_xy(x, y)
    }

    /// Linear move to `(x, y)`
    pub fn linear(x: f64, y: f64) -> Self {
        Self::new(CommandKind::Linear).with_xy(x, y)
    }

    pub fn with_xy(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_e(mut self, e: f64) -> Self {
        self.e = Some(e);
        self
    }

    pub fn with_f(mut self, f: f64) -> Self {
        self.f = Some(f);
        self
    }

    /// Both x and y present and not NaN
    pub fn has_numeric_xy(&self) -> bool {
        matches!((self.x, self.y), (Some(x), Some(y)) if !x.is_nan() && !y.is_nan())
    }

    /// Rapid or linear move with numeric x and y
    pub fn is_drawable(&self) -> bool {
        self.kind.is_motion() && self.has_numeric_xy()
    }

    /// Target position, if both x and y are present
    pub fn target(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

/// Keep only drawable commands, preserving order
pub fn drawable_commands(commands: &[MotionCommand]) -> Vec<MotionCommand> {
    commands.iter().filter(|c| c.is_drawable()).copied().collect()
}
