//! Step-driven playback engine
//!
//! [`GcodePrinter`] walks the drawable commands of a program one step at a
//! time. It never schedules itself: every step is requested by a driver
//! holding the current [`FrameHandle`], and the returned [`StepOutcome`]
//! tells the driver when to call again. That keeps the state machine free of
//! any particular runtime and lets tests step it synchronously.
//!
//! A linear move is drawn one interpolated point per call. Between points
//! the engine returns [`StepOutcome::Suspend`]; the driver waits and steps
//! again with the same handle. `stop`/`reset` invalidate the handle, so a
//! step that was already queued is rejected as a stale frame.

use super::layers::{LayerId, LayerRegistry};
use crate::gcode::{drawable_commands, CommandKind, MotionCommand};
use crate::geometry::{
    format_coord, points_between_with, Point, DEFAULT_SUBDIVISIONS, MAX_SUBDIVISIONS,
};
use crate::render::{RenderSurface, SvgScene};
use gcodeprint_core::PlaybackError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// CSS class given to rapid-move markers
pub const RAPID_MARKER_CLASS: &str = "G0";

const DEFAULT_SEGMENT_INTERVAL: Duration = Duration::from_millis(8);
const DEFAULT_MARKER_RADIUS: f64 = 0.15;

/// Tuning knobs for playback
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterOptions {
    /// Equal parts each linear move is split into, clamped to
    /// [`MAX_SUBDIVISIONS`]
    pub subdivisions: usize,
    /// Time spread over the points of one linear move
    pub segment_interval: Duration,
    /// Radius of rapid-move markers
    pub marker_radius: f64,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            subdivisions: DEFAULT_SUBDIVISIONS,
            segment_interval: DEFAULT_SEGMENT_INTERVAL,
            marker_radius: DEFAULT_MARKER_RADIUS,
        }
    }
}

/// Token authorising exactly one scheduled step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Position in the drawable command list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// Sentinel set by `reset`
    NotStarted,
    /// Index of the next command; equal to the list length once exhausted
    At(usize),
}

impl Cursor {
    pub fn index(&self) -> Option<usize> {
        match self {
            Cursor::NotStarted => None,
            Cursor::At(i) => Some(*i),
        }
    }

    /// Signed form, `-1` for [`Cursor::NotStarted`]
    pub fn as_i64(&self) -> i64 {
        match self {
            Cursor::NotStarted => -1,
            Cursor::At(i) => *i as i64,
        }
    }
}

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Nothing has been printed yet
    Idle,
    Running,
    /// Finished, halted, stopped or reset
    Stopped,
}

impl PlaybackPhase {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "Idle",
            PlaybackPhase::Running => "Running",
            PlaybackPhase::Stopped => "Stopped",
        }
    }
}

/// What the driver should do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The command is done; step again on the next frame with this handle
    Continue(FrameHandle),
    /// Mid-segment; wait this long, then step again with the same handle
    Suspend(Duration),
    /// The run is over
    Done,
}

/// Read-only view of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub z: f64,
    pub attached: bool,
    pub token_count: usize,
    pub path_data: String,
}

/// Read-only diagnostic snapshot of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub is_printing: bool,
    pub cursor: Cursor,
    pub drawable_len: usize,
    pub current_point: Option<Point>,
    pub current_layer_z: Option<f64>,
    pub layers: Vec<LayerSnapshot>,
}

#[derive(Debug, Clone)]
struct SegmentProgress {
    points: Vec<Point>,
    next: usize,
    delay: Duration,
    target: Point,
}

/// Animated layer-by-layer playback of motion commands onto a surface
#[derive(Debug)]
pub struct GcodePrinter<S: RenderSurface = SvgScene> {
    surface: S,
    options: PrinterOptions,
    drawable: Vec<MotionCommand>,
    layers: LayerRegistry,
    cursor: Cursor,
    is_printing: bool,
    current_point: Option<Point>,
    current_layer: Option<LayerId>,
    frame: Option<FrameHandle>,
    next_frame_id: u64,
    phase: PlaybackPhase,
    segment: Option<SegmentProgress>,
    emissions: Vec<(f64, String)>,
}

impl<S: RenderSurface> GcodePrinter<S> {
    pub fn new(surface: S) -> Self {
        Self::with_options(surface, PrinterOptions::default())
    }

    pub fn with_options(surface: S, options: PrinterOptions) -> Self {
        Self {
            surface,
            options,
            drawable: Vec::new(),
            layers: LayerRegistry::new(),
            cursor: Cursor::At(0),
            is_printing: false,
            current_point: Some(Point::ORIGIN),
            current_layer: None,
            frame: None,
            next_frame_id: 0,
            phase: PlaybackPhase::Idle,
            segment: None,
            emissions: Vec::new(),
        }
    }

    /// Start a fresh run over `commands`.
    ///
    /// Commands that are not rapid/linear moves with numeric x and y are
    /// dropped. If nothing drawable remains the call is rejected and the
    /// engine is left exactly as it was.
    pub fn print(&mut self, commands: &[MotionCommand]) -> Result<&mut Self, PlaybackError> {
        let drawable = drawable_commands(commands);
        match drawable.first() {
            None => {
                debug!("Print rejected: no drawable commands in {}", commands.len());
                return Err(PlaybackError::rejected("no drawable commands"));
            }
            Some(first) if !first.has_numeric_xy() => {
                debug!("Print rejected: first drawable command lacks coordinates");
                return Err(PlaybackError::rejected(
                    "first drawable command lacks numeric x/y",
                ));
            }
            Some(_) => {}
        }

        self.teardown();
        self.surface.clear();
        self.emissions.clear();

        let default_layer = self.layers.resolve(0.0);
        self.layers.attach(default_layer, &mut self.surface);
        self.current_layer = Some(default_layer);

        info!(
            "Printing {} drawable of {} commands",
            drawable.len(),
            commands.len()
        );
        self.drawable = drawable;
        self.cursor = Cursor::At(0);
        self.is_printing = true;
        self.current_point = Some(Point::ORIGIN);
        self.phase = PlaybackPhase::Running;
        let frame = self.issue_frame();
        trace!("First frame {}", frame.0);
        Ok(self)
    }

    /// Cancel the run and clear every layer. Safe to call at any time.
    pub fn stop(&mut self) {
        self.teardown();
        if self.phase != PlaybackPhase::Idle {
            self.phase = PlaybackPhase::Stopped;
        }
        info!("Printer stopped");
    }

    /// Discard the active layer's path and rewind the cursor.
    ///
    /// Unlike [`stop`](Self::stop) the other layers stay registered and on
    /// the surface.
    pub fn reset(&mut self) {
        self.cursor = Cursor::NotStarted;
        self.is_printing = false;
        self.frame = None;
        self.segment = None;
        if let Some(id) = self.current_layer {
            self.layers.discard_path(id, &mut self.surface);
        }
        if self.phase == PlaybackPhase::Running {
            self.phase = PlaybackPhase::Stopped;
        }
        info!("Printer reset");
    }

    /// Execute one step for `frame`.
    pub fn step(&mut self, frame: FrameHandle) -> Result<StepOutcome, PlaybackError> {
        if self.frame != Some(frame) {
            return Err(PlaybackError::StaleFrame {
                frame: frame.0,
                current: self.frame.map(|f| f.0),
            });
        }

        if let Some(segment) = self.segment.take() {
            return Ok(self.continue_segment(segment));
        }

        let index = match self.cursor {
            Cursor::At(i) if self.is_printing && i < self.drawable.len() => i,
            _ => {
                self.stop();
                return Ok(StepOutcome::Done);
            }
        };
        let cmd = self.drawable[index];

        if let Some(z) = cmd.z.filter(|z| !z.is_nan()) {
            self.activate_layer(z);
        }

        let Some(target) = cmd.target().filter(Point::is_finite) else {
            return Err(self.halt_undefined(index));
        };

        match cmd.kind {
            CommandKind::Rapid => {
                self.surface
                    .append_marker(target, self.options.marker_radius, RAPID_MARKER_CLASS);
            }
            CommandKind::Linear => {
                let Some(from) = self.current_point else {
                    return Err(self.halt_undefined(index));
                };
                let subdivisions = self.options.subdivisions.min(MAX_SUBDIVISIONS);
                let mut points = Vec::with_capacity(subdivisions + 1);
                points.push(from);
                points.extend(points_between_with(from, target, subdivisions));
                points.push(target);
                // at most MAX_SUBDIVISIONS + 1 points
                let delay = self.options.segment_interval / points.len() as u32;
                return Ok(self.continue_segment(SegmentProgress {
                    points,
                    next: 0,
                    delay,
                    target,
                }));
            }
            CommandKind::Other => {}
        }

        Ok(self.finish_command(target))
    }

    /// Step synchronously until the run ends, ignoring all delays.
    ///
    /// Returns the number of steps taken.
    pub fn run_to_completion(&mut self) -> Result<usize, PlaybackError> {
        let mut steps = 0;
        while let Some(frame) = self.frame {
            steps += 1;
            if self.step(frame)? == StepOutcome::Done {
                break;
            }
        }
        Ok(steps)
    }

    /// Rotate the active layer's path. Returns false if no layer is active.
    pub fn apply_rotation(&mut self, degrees: f64) -> bool {
        let node = self
            .current_layer
            .and_then(|id| self.layers.get(id))
            .and_then(|layer| layer.node());
        match node {
            Some(node) => {
                let transform = format!("rotate({})", format_coord(degrees));
                debug!("Applying {} to {}", transform, node);
                self.surface.set_transform(node, &transform);
                true
            }
            None => false,
        }
    }

    pub fn peek_state(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            is_printing: self.is_printing,
            cursor: self.cursor,
            drawable_len: self.drawable.len(),
            current_point: self.current_point,
            current_layer_z: self.current_layer_z(),
            layers: self
                .layers
                .iter()
                .map(|(_, layer)| LayerSnapshot {
                    z: layer.z(),
                    attached: layer.is_attached(),
                    token_count: layer.token_count(),
                    path_data: layer.path_data().to_string(),
                })
                .collect(),
        }
    }

    /// Handle the driver must present for the next step
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_printing(&self) -> bool {
        self.is_printing
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current_point
    }

    pub fn current_layer(&self) -> Option<LayerId> {
        self.current_layer
    }

    pub fn current_layer_z(&self) -> Option<f64> {
        self.current_layer
            .and_then(|id| self.layers.get(id))
            .map(|layer| layer.z())
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn drawable_commands(&self) -> &[MotionCommand] {
        &self.drawable
    }

    /// Every path token written this run, with the z of its layer
    pub fn emissions(&self) -> &[(f64, String)] {
        &self.emissions
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn activate_layer(&mut self, z: f64) {
        let id = self.layers.resolve(z);
        if self.layers.attach(id, &mut self.surface) {
            debug!("Layer z={} attached", z);
        }
        self.current_layer = Some(id);
    }

    fn continue_segment(&mut self, mut segment: SegmentProgress) -> StepOutcome {
        if !self.is_printing {
            debug!("Segment abandoned, printer no longer running");
            return StepOutcome::Done;
        }

        // print() installs the default layer and only stop() clears it
        debug_assert!(self.current_layer.is_some(), "segment without active layer");

        let point = segment.points[segment.next];
        segment.next += 1;

        if let Some(layer) = self.current_layer.and_then(|id| self.layers.get_mut(id)) {
            let token = layer.push_point(point);
            if let Some(node) = layer.node() {
                self.surface.push_path_token(node, &token);
            }
            trace!("z={} {}", layer.z(), token);
            self.emissions.push((layer.z(), token));
        }

        if segment.next < segment.points.len() {
            let delay = segment.delay;
            self.segment = Some(segment);
            return StepOutcome::Suspend(delay);
        }
        self.finish_command(segment.target)
    }

    fn finish_command(&mut self, target: Point) -> StepOutcome {
        self.current_point = Some(target);
        let next = self.cursor.index().map_or(0, |i| i + 1);
        self.cursor = Cursor::At(next);
        self.is_printing = next < self.drawable.len();

        if self.is_printing {
            return StepOutcome::Continue(self.issue_frame());
        }

        self.frame = None;
        self.phase = PlaybackPhase::Stopped;
        info!(
            "Print complete: {} commands, {} layers",
            next,
            self.layers.len()
        );
        StepOutcome::Done
    }

    fn halt_undefined(&mut self, index: usize) -> PlaybackError {
        warn!("Command {} has no usable position, halting", index);
        self.current_point = None;
        self.is_printing = false;
        self.frame = None;
        self.segment = None;
        self.phase = PlaybackPhase::Stopped;
        PlaybackError::UndefinedCurrentPoint { cursor: index }
    }

    fn issue_frame(&mut self) -> FrameHandle {
        self.next_frame_id += 1;
        let frame = FrameHandle(self.next_frame_id);
        self.frame = Some(frame);
        frame
    }

    fn teardown(&mut self) {
        if let Some(frame) = self.frame.take() {
            debug!("Cancelled pending frame {}", frame.0);
        }
        self.segment = None;
        self.layers.clear(&mut self.surface);
        self.current_layer = None;
        self.current_point = Some(Point::ORIGIN);
        self.cursor = Cursor::At(0);
        self.is_printing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer() -> GcodePrinter<SvgScene> {
        GcodePrinter::with_options(
            SvgScene::new(),
            PrinterOptions {
                segment_interval: Duration::ZERO,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_new_printer_is_idle() {
        let p = printer();
        let state = p.peek_state();
        assert_eq!(state.phase, PlaybackPhase::Idle);
        assert!(!state.is_printing);
        assert_eq!(state.cursor, Cursor::At(0));
        assert!(state.layers.is_empty());
        assert_eq!(p.pending_frame(), None);
    }

    #[test]
    fn test_print_sets_up_default_layer() {
        let mut p = printer();
        p.print(&[MotionCommand::linear(1.0, 1.0)]).expect("print");

        let state = p.peek_state();
        assert_eq!(state.phase, PlaybackPhase::Running);
        assert!(state.is_printing);
        assert_eq!(state.cursor, Cursor::At(0));
        assert_eq!(state.current_point, Some(Point::ORIGIN));
        assert_eq!(state.current_layer_z, Some(0.0));
        assert_eq!(state.layers.len(), 1);
        assert!(state.layers[0].attached);
        assert!(p.pending_frame().is_some());
    }

    #[test]
    fn test_linear_move_suspends_between_points() {
        let mut p = GcodePrinter::new(SvgScene::new());
        p.print(&[MotionCommand::linear(10.0, 0.0)]).expect("print");
        let frame = p.pending_frame().expect("frame");

        // 5 points: start, 3 interior, end
        let per_point = DEFAULT_SEGMENT_INTERVAL / 5;
        for _ in 0..4 {
            assert_eq!(p.step(frame), Ok(StepOutcome::Suspend(per_point)));
        }
        assert_eq!(p.step(frame), Ok(StepOutcome::Done));
        assert_eq!(p.surface().path_commits(), 5);
    }

    #[test]
    fn test_stale_frame_is_rejected() {
        let mut p = printer();
        p.print(&[MotionCommand::linear(1.0, 0.0), MotionCommand::linear(2.0, 0.0)])
            .expect("print");
        let first = p.pending_frame().expect("frame");
        while let Ok(StepOutcome::Suspend(_)) = p.step(first) {}

        let err = p.step(first).expect_err("old handle must be stale");
        assert!(matches!(err, PlaybackError::StaleFrame { .. }));
        assert_eq!(p.cursor(), Cursor::At(1));
    }

    #[test]
    fn test_step_after_stop_is_stale() {
        let mut p = printer();
        p.print(&[MotionCommand::linear(1.0, 0.0)]).expect("print");
        let frame = p.pending_frame().expect("frame");
        p.stop();

        assert_eq!(
            p.step(frame),
            Err(PlaybackError::StaleFrame {
                frame: frame.id(),
                current: None
            })
        );
        assert!(p.layers().is_empty());
    }

    #[test]
    fn test_stop_mid_segment_abandons_points() {
        let mut p = printer();
        p.print(&[MotionCommand::linear(8.0, 0.0)]).expect("print");
        let frame = p.pending_frame().expect("frame");
        assert!(matches!(p.step(frame), Ok(StepOutcome::Suspend(_))));

        p.stop();
        assert!(p.step(frame).is_err());
        assert_eq!(p.emissions().len(), 1);
        assert!(p.surface().is_empty());
    }

    #[test]
    fn test_rapid_places_marker_without_path() {
        let mut p = printer();
        p.print(&[MotionCommand::rapid(3.0, 4.0)]).expect("print");
        p.run_to_completion().expect("run");

        assert_eq!(p.surface().markers(RAPID_MARKER_CLASS), vec![Point::new(3.0, 4.0)]);
        assert!(p.emissions().is_empty());
        assert_eq!(p.current_point(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_other_kinds_are_filtered() {
        let mut p = printer();
        let cmds = [
            MotionCommand::new(CommandKind::Other).with_xy(9.0, 9.0),
            MotionCommand::linear(1.0, 0.0),
        ];
        p.print(&cmds).expect("print");
        assert_eq!(p.drawable_commands().len(), 1);
    }

    #[test]
    fn test_rejected_print_keeps_running_run() {
        let mut p = printer();
        p.print(&[MotionCommand::linear(1.0, 0.0), MotionCommand::linear(2.0, 0.0)])
            .expect("print");
        let before = p.peek_state();
        let frame = p.pending_frame();

        assert!(p.print(&[]).is_err());
        assert_eq!(p.peek_state(), before);
        assert_eq!(p.pending_frame(), frame);
    }

    #[test]
    fn test_infinite_target_halts_with_undefined_point() {
        let mut p = printer();
        let cmds = [
            MotionCommand::linear(1.0, 1.0),
            MotionCommand::linear(f64::INFINITY, 0.0),
            MotionCommand::linear(2.0, 2.0),
        ];
        p.print(&cmds).expect("print");

        let err = p.run_to_completion().expect_err("halt");
        assert_eq!(err, PlaybackError::UndefinedCurrentPoint { cursor: 1 });
        assert!(!p.is_printing());
        assert_eq!(p.current_point(), None);
        assert_eq!(p.pending_frame(), None);
        assert_eq!(p.phase(), PlaybackPhase::Stopped);
    }

    #[test]
    fn test_reset_discards_active_path_only() {
        let mut p = printer();
        let cmds = [
            MotionCommand::linear(1.0, 0.0),
            MotionCommand::linear(2.0, 0.0).with_z(0.2),
            MotionCommand::linear(3.0, 0.0),
        ];
        p.print(&cmds).expect("print");
        let frame = p.pending_frame().expect("frame");
        while let Ok(StepOutcome::Suspend(_)) = p.step(frame) {}
        let frame = p.pending_frame().expect("frame");
        while let Ok(StepOutcome::Suspend(_)) = p.step(frame) {}

        p.reset();

        assert_eq!(p.cursor(), Cursor::NotStarted);
        assert_eq!(p.cursor().as_i64(), -1);
        assert!(!p.is_printing());
        assert_eq!(p.layers().len(), 2);
        let state = p.peek_state();
        assert_eq!(state.layers[0].token_count, 5);
        assert_eq!(state.layers[1].token_count, 0);
        assert!(!state.layers[1].attached);
        assert_eq!(p.surface().paths().len(), 1);
        assert!(p.step(frame).is_err());
    }

    #[test]
    fn test_rotation_targets_active_layer() {
        let mut p = printer();
        assert!(!p.apply_rotation(45.0), "no active layer before print");

        p.print(&[
            MotionCommand::linear(1.0, 0.0),
            MotionCommand::linear(1.0, 1.0).with_z(0.4),
        ])
        .expect("print");
        p.run_to_completion().expect("run");

        assert!(p.apply_rotation(90.0));
        let paths = p.surface().paths();
        assert_eq!(p.surface().transform(paths[0].0), None);
        assert_eq!(p.surface().transform(paths[1].0), Some("rotate(90)"));
    }

    #[test]
    fn test_zero_subdivisions_draws_endpoints_only() {
        let mut p = GcodePrinter::with_options(
            SvgScene::new(),
            PrinterOptions {
                subdivisions: 0,
                segment_interval: Duration::ZERO,
                ..Default::default()
            },
        );
        p.print(&[MotionCommand::linear(4.0, 0.0)]).expect("print");
        p.run_to_completion().expect("run");
        let tokens: Vec<&str> = p.emissions().iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(tokens, vec!["M 0,0", "L 4,0"]);
    }

    #[test]
    fn test_huge_subdivisions_are_clamped() {
        let mut p = GcodePrinter::with_options(
            SvgScene::new(),
            PrinterOptions {
                subdivisions: usize::MAX,
                ..Default::default()
            },
        );
        p.print(&[MotionCommand::linear(64.0, 0.0)]).expect("print");
        let frame = p.pending_frame().expect("frame");

        let per_point = DEFAULT_SEGMENT_INTERVAL / (MAX_SUBDIVISIONS as u32 + 1);
        assert_eq!(p.step(frame), Ok(StepOutcome::Suspend(per_point)));

        p.run_to_completion().expect("run");
        assert_eq!(p.emissions().len(), MAX_SUBDIVISIONS + 1);
        assert_eq!(p.current_point(), Some(Point::new(64.0, 0.0)));
    }
}
