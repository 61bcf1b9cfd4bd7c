use std::path::PathBuf;

use handcursor_common::config::{ClickMode, PipelineConfig};
use handcursor_gesture_core::{GestureState, GesturePipeline};
use handcursor_hand_model::{parse_records, DetectionRecord, Point2D, VideoDimensions};

const VIDEO: VideoDimensions = VideoDimensions {
    width: 640,
    height: 480,
};

fn load_fixture_records() -> Vec<DetectionRecord> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join("hands.jsonl");

    let content = std::fs::read_to_string(path).expect("fixture should be readable");
    parse_records(&content).expect("fixture should parse")
}

fn run(mode: ClickMode) -> (GesturePipeline, Vec<Option<GestureState>>, usize) {
    let mut pipeline = GesturePipeline::from_config(&PipelineConfig {
        click_mode: mode,
        ..PipelineConfig::default()
    });
    let mut gestures = Vec::new();
    let mut clicks = 0;
    for record in load_fixture_records() {
        let output = pipeline.process(&record.hands, VIDEO);
        if output.as_ref().is_some_and(|o| o.click) {
            clicks += 1;
        }
        gestures.push(output.map(|o| o.gesture));
    }
    (pipeline, gestures, clicks)
}

#[test]
fn sample_session_gesture_sequence_is_stable() {
    use GestureState::*;

    let (_, gestures, _) = run(ClickMode::Continuous);
    assert_eq!(
        gestures,
        vec![
            None,
            Some(Open),
            Some(Open),
            Some(Pinching),
            Some(Pinching),
            None,
            Some(Open),
            Some(Pinching),
            None,
            Some(Open),
        ]
    );
}

#[test]
fn sample_session_click_counts_per_mode() {
    let (_, _, continuous) = run(ClickMode::Continuous);
    let (_, _, on_enter) = run(ClickMode::OnEnter);
    assert_eq!(continuous, 3);
    assert_eq!(on_enter, 2);
}

#[test]
fn sample_session_cursor_drifts_right_and_up() {
    // The fingertip moves left and up in the video; the mirrored cursor
    // moves right and up on the canvas.
    let (pipeline, _, _) = run(ClickMode::Continuous);
    let position = pipeline.position();
    assert!(position.x > 0.0, "{position:?}");
    assert!(position.y < 0.0, "{position:?}");
    assert!(pipeline.mapper().bounds().contains(&position));
    assert_ne!(position, Point2D::ORIGIN);
}
