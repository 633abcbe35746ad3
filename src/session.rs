//! Playback session
//!
//! Wires the pieces a host needs for one window: the event bus, the state
//! store, a shared printer drawing into an [`SvgScene`] and the rotation
//! bridge between them.

use anyhow::Context;
use gcodeprint_core::state::DEFAULT_TITLE;
use gcodeprint_core::{AppState, EventBus, GcodeFileEntry};
use gcodeprint_settings::Config;
use gcodeprint_visualizer::{
    run_playback, shared_printer, CommandSource, GcodePrinter, GcodeReader, IntervalFramePump,
    PlaybackReport, RotationBridge, SharedPrinter, SvgScene,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const LOADING_TITLE: &str = "loading...";

pub struct PlaybackSession {
    config: Config,
    state: AppState,
    printer: SharedPrinter<SvgScene>,
    reader: GcodeReader,
    _rotation: RotationBridge,
}

impl PlaybackSession {
    pub fn new(config: Config) -> Self {
        let bus = Arc::new(EventBus::new());
        let state = AppState::new(Arc::clone(&bus));
        let printer = shared_printer(GcodePrinter::with_options(
            SvgScene::new(),
            config.playback.to_printer_options(),
        ));
        let rotation = RotationBridge::connect(&bus, &printer);
        Self {
            config,
            state,
            printer,
            reader: GcodeReader::new(),
            _rotation: rotation,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn printer(&self) -> &SharedPrinter<SvgScene> {
        &self.printer
    }

    /// Load a G-code file and play it to the end at the configured frame rate
    pub async fn play_file(&self, path: &Path) -> anyhow::Result<PlaybackReport> {
        self.state.set_app_title(LOADING_TITLE);
        self.state.set_filepath(path);

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.state
            .add_files([GcodeFileEntry::new(name.clone(), path)]);

        let report = self.play_text(&text).await;
        self.state.set_app_title(DEFAULT_TITLE);
        let report = report.with_context(|| format!("Playback of {} failed", name))?;
        info!(
            "{}: {} frames, {} steps, {:?}",
            name, report.frames, report.steps, report.exit
        );
        Ok(report)
    }

    /// Parse and play program text
    pub async fn play_text(&self, text: &str) -> anyhow::Result<PlaybackReport> {
        let commands = self.reader.commands(text);
        self.printer.lock().print(&commands)?;

        let pump = IntervalFramePump::new(self.config.playback.frame_interval());
        let report = run_playback(Arc::clone(&self.printer), pump).await?;
        Ok(report)
    }

    /// Rotate the view by `delta` degrees
    pub fn rotate_by(&self, delta: f64) -> f64 {
        self.state.rotate_by(delta)
    }

    /// The current drawing as an SVG document
    pub fn svg(&self) -> String {
        let render = &self.config.render;
        self.printer
            .lock()
            .surface()
            .to_svg_document(render.width, render.height, render.stroke_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodeprint_visualizer::PlaybackExit;
    use std::io::Write;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.playback.segment_interval_ms = 0;
        config.playback.frame_interval_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_play_text_draws_layers() {
        let session = PlaybackSession::new(fast_config());
        let report = session
            .play_text("G0 X0 Y0\nG1 X5 Y0 Z1\nG1 X5 Y5\n")
            .await
            .expect("play");

        assert_eq!(report.exit, PlaybackExit::Completed);
        let svg = session.svg();
        assert!(svg.contains(r#"data-z="1""#));
        assert!(svg.contains(r#"viewBox="0 0 200 200""#));
    }

    #[tokio::test]
    async fn test_rejected_program_is_an_error() {
        let session = PlaybackSession::new(fast_config());
        let err = session.play_text("G28\nM104 S0\n").await.expect_err("nothing to draw");
        assert!(err.to_string().contains("no drawable commands"));
    }

    #[tokio::test]
    async fn test_rotation_after_playback() {
        let session = PlaybackSession::new(fast_config());
        session
            .play_text("G1 X1 Y1 Z0.2\n")
            .await
            .expect("play");

        assert_eq!(session.rotate_by(45.0), 45.0);
        assert!(session.svg().contains(r#"transform="rotate(45)""#));
    }

    #[tokio::test]
    async fn test_play_file_updates_state() {
        let mut file = tempfile::Builder::new()
            .suffix(".gcode")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "; two layers").expect("write");
        writeln!(file, "G0 X0 Y0 Z0.2").expect("write");
        writeln!(file, "G1 X10 Y0 E1").expect("write");
        writeln!(file, "G1 X10 Y10 Z0.4 E2").expect("write");
        file.flush().expect("flush");

        let mut config = fast_config();
        config.render.width = 50.0;
        config.render.height = 50.0;
        let session = PlaybackSession::new(config);
        let report = session.play_file(file.path()).await.expect("play");

        assert_eq!(report.exit, PlaybackExit::Completed);
        assert_eq!(report.frames, 3);

        let state = session.state().snapshot();
        assert_eq!(state.app_title, DEFAULT_TITLE);
        assert_eq!(state.filepath.as_deref(), Some(file.path()));
        assert_eq!(state.files.len(), 1);

        let snapshot = session.printer().lock().peek_state();
        assert!(!snapshot.is_printing);
        let zs: Vec<f64> = snapshot.layers.iter().map(|l| l.z).collect();
        assert_eq!(zs, vec![0.0, 0.2, 0.4]);

        let svg = session.svg();
        assert!(svg.contains(r#"viewBox="0 0 50 50""#));
        assert_eq!(svg.matches("<path").count(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let session = PlaybackSession::new(fast_config());
        let dir = tempfile::tempdir().expect("tempdir");
        let err = session
            .play_file(&dir.path().join("missing.gcode"))
            .await
            .expect_err("missing");

        assert!(err.to_string().contains("Failed to read"));
        assert_eq!(session.state().app_title(), LOADING_TITLE);
    }
}
