//! State store and event bus working together

use gcodeprint_core::state::{DEFAULT_TITLE, ROTATION_STEP_DEGREES};
use gcodeprint_core::{AppEvent, AppState, EventBus, EventFilter, GcodeFileEntry, Topic};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_rotate_button_accumulates() {
    let bus = Arc::new(EventBus::new());
    let state = AppState::new(Arc::clone(&bus));
    let angles = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&angles);
    bus.subscribe(EventFilter::Topics(vec![Topic::Rotation]), move |event| {
        if let AppEvent::Rotation { degrees } = event {
            sink.lock().push(degrees);
        }
    });

    for _ in 0..3 {
        state.rotate_by(ROTATION_STEP_DEGREES);
    }

    assert_eq!(*angles.lock(), vec![45.0, 90.0, 135.0]);
    assert_eq!(state.rotation(), 135.0);
}

#[test]
fn test_file_list_is_append_only() {
    let bus = Arc::new(EventBus::new());
    let state = AppState::new(bus);

    state.add_files(vec![GcodeFileEntry::new("cube.gcode", "/tmp/cube.gcode")]);
    state.add_files(vec![
        GcodeFileEntry::new("benchy.gcode", "/tmp/benchy.gcode"),
        GcodeFileEntry::new("cube.gcode", "/tmp/other/cube.gcode"),
    ]);
    state.add_files(Vec::new());

    let names: Vec<String> = state.files().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["cube.gcode", "benchy.gcode", "cube.gcode"]);
}

#[test]
fn test_updates_without_listeners_do_not_fail() {
    let state = AppState::new(Arc::new(EventBus::new()));
    assert_eq!(state.app_title(), DEFAULT_TITLE);

    state.set_app_title("loading...");
    state.set_draw_points(true);
    state.set_filepath("/tmp/part.gcode");

    let snapshot = state.snapshot();
    assert_eq!(snapshot.app_title, "loading...");
    assert!(snapshot.draw_points);
    assert!(snapshot.filepath.is_some());
}

#[tokio::test]
async fn test_async_receiver_sees_every_topic() {
    let bus = Arc::new(EventBus::new());
    let mut rx = bus.receiver();
    let state = AppState::new(Arc::clone(&bus));

    state.set_app_title("3D Printer - cube.gcode");
    state.set_filepath("cube.gcode");
    state.add_files(vec![GcodeFileEntry::new("cube.gcode", "cube.gcode")]);
    state.set_draw_points(true);
    state.set_rotation(90.0);

    let mut topics = Vec::new();
    for _ in 0..5 {
        let event = rx.recv().await.expect("event");
        topics.push(event.topic());
    }
    assert_eq!(
        topics,
        vec![
            Topic::Title,
            Topic::File,
            Topic::Files,
            Topic::DrawPoints,
            Topic::Rotation
        ]
    );
}
