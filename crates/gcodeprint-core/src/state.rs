//! Application state store
//!
//! Holds the host-level settings that drive playback (selected file,
//! rotation, title, point-marker mode, file list). Each field has a fixed
//! update rule:
//! - scalars are replaced
//! - the file list is append-only
//!
//! Every update publishes the matching [`AppEvent`] on the injected bus.

use crate::event_bus::{AppEvent, EventBus};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Title shown while idle
pub const DEFAULT_TITLE: &str = "3D Printer";

/// Degrees added by a single press of the rotate control
pub const ROTATION_STEP_DEGREES: f64 = 45.0;

/// A G-code file known to the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeFileEntry {
    pub name: String,
    pub path: PathBuf,
}

impl GcodeFileEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Point-in-time copy of the application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppStateSnapshot {
    pub app_title: String,
    pub filepath: Option<PathBuf>,
    pub draw_points: bool,
    pub rotation: f64,
    pub files: Vec<GcodeFileEntry>,
}

impl Default for AppStateSnapshot {
    fn default() -> Self {
        Self {
            app_title: DEFAULT_TITLE.to_string(),
            filepath: None,
            draw_points: false,
            rotation: 0.0,
            files: Vec::new(),
        }
    }
}

/// Typed application state publishing every change on an [`EventBus`]
#[derive(Debug)]
pub struct AppState {
    bus: Arc<EventBus>,
    values: RwLock<AppStateSnapshot>,
}

impl AppState {
    /// Create a store with default values
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_initial(bus, AppStateSnapshot::default())
    }

    /// Create a store seeded with the given values (nothing is published)
    pub fn with_initial(bus: Arc<EventBus>, initial: AppStateSnapshot) -> Self {
        Self {
            bus,
            values: RwLock::new(initial),
        }
    }

    /// The bus this store publishes on
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn snapshot(&self) -> AppStateSnapshot {
        self.values.read().clone()
    }

    pub fn app_title(&self) -> String {
        self.values.read().app_title.clone()
    }

    pub fn set_app_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.values.write().app_title = title.clone();
        self.emit(AppEvent::TitleChanged { title });
    }

    pub fn filepath(&self) -> Option<PathBuf> {
        self.values.read().filepath.clone()
    }

    pub fn set_filepath(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.values.write().filepath = Some(path.clone());
        self.emit(AppEvent::FileSelected { path });
    }

    pub fn draw_points(&self) -> bool {
        self.values.read().draw_points
    }

    pub fn set_draw_points(&self, enabled: bool) {
        self.values.write().draw_points = enabled;
        self.emit(AppEvent::DrawPointsToggled { enabled });
    }

    pub fn rotation(&self) -> f64 {
        self.values.read().rotation
    }

    /// Replace the rotation with an absolute angle in degrees
    pub fn set_rotation(&self, degrees: f64) {
        self.values.write().rotation = degrees;
        self.emit(AppEvent::Rotation { degrees });
    }

    /// Add `delta` degrees to the current rotation and return the new angle
    pub fn rotate_by(&self, delta: f64) -> f64 {
        let degrees = {
            let mut values = self.values.write();
            values.rotation += delta;
            values.rotation
        };
        self.emit(AppEvent::Rotation { degrees });
        degrees
    }

    pub fn files(&self) -> Vec<GcodeFileEntry> {
        self.values.read().files.clone()
    }

    /// Append entries to the file list. Existing entries are never replaced.
    pub fn add_files(&self, entries: impl IntoIterator<Item = GcodeFileEntry>) {
        let entries: Vec<GcodeFileEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return;
        }
        let names = entries.iter().map(|e| e.name.clone()).collect();
        self.values.write().files.extend(entries);
        self.emit(AppEvent::FilesAdded { names });
    }

    fn emit(&self, event: AppEvent) {
        // Nobody listening is a normal condition for a state store.
        if let Err(e) = self.bus.publish(event) {
            tracing::trace!("State update not delivered: {}", e);
        }
    }
}
