//! Event type definitions for the event bus.
//!
//! One variant per topic. Events are cloneable and serializable so they can
//! be logged or replayed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// The application title changed (e.g. "loading...")
    TitleChanged {
        /// New title text.
        title: String,
    },
    /// A different G-code file was selected for playback.
    FileSelected {
        /// Path of the selected file.
        path: PathBuf,
    },
    /// Entries were appended to the file list.
    FilesAdded {
        /// Names of the newly listed files.
        names: Vec<String>,
    },
    /// The point-marker rendering mode was toggled.
    DrawPointsToggled {
        /// Whether point markers are enabled.
        enabled: bool,
    },
    /// The view rotation changed.
    Rotation {
        /// Absolute rotation in degrees.
        degrees: f64,
    },
}

impl AppEvent {
    /// Get the topic of this event
    pub fn topic(&self) -> Topic {
        match self {
            AppEvent::TitleChanged { .. } => Topic::Title,
            AppEvent::FileSelected { .. } => Topic::File,
            AppEvent::FilesAdded { .. } => Topic::Files,
            AppEvent::DrawPointsToggled { .. } => Topic::DrawPoints,
            AppEvent::Rotation { .. } => Topic::Rotation,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::TitleChanged { title } => format!("Title changed to '{}'", title),
            AppEvent::FileSelected { path } => format!("File selected: {}", path.display()),
            AppEvent::FilesAdded { names } => format!("{} file(s) added", names.len()),
            AppEvent::DrawPointsToggled { enabled } => {
                format!("Draw points {}", if *enabled { "on" } else { "off" })
            }
            AppEvent::Rotation { degrees } => format!("Rotation set to {}°", degrees),
        }
    }
}

/// Event topic for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Application title.
    Title,
    /// Selected file path.
    File,
    /// File list.
    Files,
    /// Point-marker mode.
    DrawPoints,
    /// View rotation.
    Rotation,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Title => write!(f, "title"),
            Topic::File => write!(f, "file"),
            Topic::Files => write!(f, "files"),
            Topic::DrawPoints => write!(f, "draw-points"),
            Topic::Rotation => write!(f, "rotation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_mapping() {
        assert_eq!(AppEvent::Rotation { degrees: 90.0 }.topic(), Topic::Rotation);
        assert_eq!(
            AppEvent::FileSelected {
                path: PathBuf::from("a.gcode")
            }
            .topic(),
            Topic::File
        );
        assert_eq!(
            AppEvent::DrawPointsToggled { enabled: true }.topic(),
            Topic::DrawPoints
        );
    }

    #[test]
    fn test_description() {
        let event = AppEvent::FilesAdded {
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(event.description(), "2 file(s) added");
        assert_eq!(Topic::DrawPoints.to_string(), "draw-points");
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Rotation { degrees: 45.0 };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: AppEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
