//! Async frame-paced driver
//!
//! Runs a shared [`GcodePrinter`] against a [`FramePump`]. One command is
//! started per frame; the suspensions inside a linear move are waited out
//! with `tokio::time::sleep`. The printer lock is only held for a single
//! step, so the host can stop, reset or rotate while a run is in flight.

use super::engine::{GcodePrinter, StepOutcome};
use crate::render::RenderSurface;
use async_trait::async_trait;
use gcodeprint_core::PlaybackError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

/// Printer shared between the driver, the rotation bridge and the host
pub type SharedPrinter<S> = Arc<Mutex<GcodePrinter<S>>>;

pub fn shared_printer<S: RenderSurface>(printer: GcodePrinter<S>) -> SharedPrinter<S> {
    Arc::new(Mutex::new(printer))
}

/// One display frame
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    /// Monotonic frame counter, starting at 1
    pub index: u64,
    pub now: Instant,
}

/// Source of display frames
#[async_trait]
pub trait FramePump: Send {
    /// Wait for the next frame. `None` means the host stopped pumping.
    async fn next_frame(&mut self) -> Option<FrameTick>;
}

/// Frames at a fixed interval
#[derive(Debug)]
pub struct IntervalFramePump {
    interval: Interval,
    index: u64,
}

impl IntervalFramePump {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, index: 0 }
    }
}

#[async_trait]
impl FramePump for IntervalFramePump {
    async fn next_frame(&mut self) -> Option<FrameTick> {
        let at = self.interval.tick().await;
        self.index += 1;
        Some(FrameTick {
            index: self.index,
            now: at.into_std(),
        })
    }
}

/// Frames triggered explicitly through a [`ManualFrameTrigger`]
#[derive(Debug)]
pub struct ManualFramePump {
    rx: mpsc::UnboundedReceiver<()>,
    index: u64,
}

/// Sending half of a [`ManualFramePump`]
#[derive(Debug, Clone)]
pub struct ManualFrameTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualFrameTrigger {
    /// Queue one frame. Returns false if the pump is gone.
    pub fn frame(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    /// Queue `count` frames
    pub fn frames(&self, count: usize) -> bool {
        (0..count).all(|_| self.frame())
    }
}

impl ManualFramePump {
    pub fn new() -> (Self, ManualFrameTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx, index: 0 }, ManualFrameTrigger { tx })
    }
}

#[async_trait]
impl FramePump for ManualFramePump {
    async fn next_frame(&mut self) -> Option<FrameTick> {
        self.rx.recv().await?;
        self.index += 1;
        Some(FrameTick {
            index: self.index,
            now: Instant::now(),
        })
    }
}

/// How a driven run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackExit {
    /// Every command was played
    Completed,
    /// The run was stopped, reset or replaced by another print
    Cancelled,
    /// The frame pump closed before the run finished
    PumpClosed,
    /// Nothing was scheduled when the driver started
    NotRunning,
}

/// Summary returned by [`run_playback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackReport {
    pub exit: PlaybackExit,
    /// Frames consumed from the pump
    pub frames: u64,
    /// Engine steps executed
    pub steps: u64,
}

/// Drive `printer` until its current run ends.
///
/// A stale frame means the run was stopped, reset or replaced; the driver
/// treats that as cancellation and returns. Halting on a command without a
/// usable position is returned as an error.
pub async fn run_playback<S, P>(
    printer: SharedPrinter<S>,
    mut pump: P,
) -> Result<PlaybackReport, PlaybackError>
where
    S: RenderSurface + Send,
    P: FramePump,
{
    let mut report = PlaybackReport {
        exit: PlaybackExit::NotRunning,
        frames: 0,
        steps: 0,
    };

    // Step only handles issued to this run
    let pending = printer.lock().pending_frame();
    let Some(mut frame) = pending else {
        return Ok(report);
    };

    loop {
        let Some(tick) = pump.next_frame().await else {
            debug!("Frame pump closed after {} frames", report.frames);
            report.exit = PlaybackExit::PumpClosed;
            return Ok(report);
        };
        report.frames += 1;
        trace!("Frame {} -> handle {}", tick.index, frame.id());

        loop {
            let outcome = printer.lock().step(frame);
            report.steps += 1;
            match outcome {
                Ok(StepOutcome::Suspend(delay)) => pause(delay).await,
                Ok(StepOutcome::Continue(next)) => {
                    frame = next;
                    break;
                }
                Ok(StepOutcome::Done) => {
                    let completed = {
                        let guard = printer.lock();
                        guard.cursor().index() == Some(guard.drawable_commands().len())
                    };
                    report.exit = if completed {
                        PlaybackExit::Completed
                    } else {
                        PlaybackExit::Cancelled
                    };
                    return Ok(report);
                }
                Err(PlaybackError::StaleFrame { frame, current }) => {
                    debug!("Discarding stale frame {} (current {:?})", frame, current);
                    report.exit = PlaybackExit::Cancelled;
                    return Ok(report);
                }
                Err(e) => {
                    warn!("Playback halted: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

async fn pause(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
