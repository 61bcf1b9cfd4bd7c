//! Per-frame evaluation of detector output.
//!
//! [`GesturePipeline`] owns the only state that survives between frames
//! (the smoothed cursor position and the previous gesture). Everything
//! else is recomputed from the frame's hands.

use handcursor_common::config::{ClickMode, PipelineConfig};
use handcursor_hand_model::{CanvasGeometry, Hand, Keypoint, Point2D, VideoDimensions};
use serde::Serialize;

use crate::mapping::CursorMapper;
use crate::pinch::{GestureState, PinchClassifier};
use crate::smoothing::CursorSmoother;

/// Result of evaluating one frame that contained a usable hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    /// The fingertip that drove the cursor, in video pixels.
    pub fingertip: Keypoint,
    /// Clamped target before smoothing.
    pub target: Point2D,
    /// Smoothed cursor position after this frame.
    pub position: Point2D,
    /// Gesture classified for this frame.
    pub gesture: GestureState,
    /// Whether this frame should dispatch a synthetic click.
    pub click: bool,
}

/// Landmark extraction, classification, mapping and smoothing in sequence.
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    mapper: CursorMapper,
    smoother: CursorSmoother,
    classifier: PinchClassifier,
    click_mode: ClickMode,
    previous_gesture: GestureState,
}

impl GesturePipeline {
    pub fn new(
        mapper: CursorMapper,
        smoother: CursorSmoother,
        classifier: PinchClassifier,
        click_mode: ClickMode,
    ) -> Self {
        Self {
            mapper,
            smoother,
            classifier,
            click_mode,
            previous_gesture: GestureState::Open,
        }
    }

    /// Build a pipeline from configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let canvas = CanvasGeometry::new(
            config.canvas_width,
            config.canvas_height,
            config.cursor_size,
        );
        Self::new(
            CursorMapper::new(config.scale_factor, canvas),
            CursorSmoother::new(config.lerp_factor),
            PinchClassifier::new(config.pinch_tolerance),
            config.click_mode,
        )
    }

    /// Evaluate one frame of detector output.
    ///
    /// Returns `None` when there is no hand or the first hand has no index
    /// fingertip; the cursor and gesture state are left untouched.
    pub fn process(&mut self, hands: &[Hand], video: VideoDimensions) -> Option<FrameOutput> {
        let hand = hands.first()?;
        let fingertip = hand.index_finger_tip()?.clone();

        let gesture = self.classifier.classify_hand(hand);
        let target = self.mapper.target(&fingertip, video);
        let position = self.smoother.step(target);
        let click = should_click(self.click_mode, self.previous_gesture, gesture);
        self.previous_gesture = gesture;

        tracing::trace!(
            x = position.x,
            y = position.y,
            ?gesture,
            click,
            "Frame evaluated"
        );

        Some(FrameOutput {
            fingertip,
            target,
            position,
            gesture,
            click,
        })
    }

    /// Current smoothed cursor position.
    pub fn position(&self) -> Point2D {
        self.smoother.position()
    }

    /// Gesture classified on the most recent evaluated frame.
    pub fn previous_gesture(&self) -> GestureState {
        self.previous_gesture
    }

    pub fn mapper(&self) -> &CursorMapper {
        &self.mapper
    }

    /// Forget all cross-frame state.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.previous_gesture = GestureState::Open;
    }
}

/// Whether the transition `previous → current` should produce a click.
pub fn should_click(mode: ClickMode, previous: GestureState, current: GestureState) -> bool {
    match mode {
        ClickMode::Continuous => current.is_pinching(),
        ClickMode::OnEnter => current.is_pinching() && !previous.is_pinching(),
    }
}
