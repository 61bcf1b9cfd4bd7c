//! Pinch gesture classification.
//!
//! A pinch is the thumb tip and index fingertip being close on *both* axes.
//! The test is axis-aligned rather than Euclidean, and the tolerance is in
//! raw source-video pixels, so it is not normalised for hand size or camera
//! distance.

use handcursor_hand_model::{Hand, Keypoint};
use serde::{Deserialize, Serialize};

/// Discrete gesture state derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    /// Thumb and index apart.
    #[default]
    Open,
    /// Thumb and index within tolerance on both axes.
    Pinching,
}

impl GestureState {
    pub fn is_pinching(self) -> bool {
        self == GestureState::Pinching
    }
}

impl From<bool> for GestureState {
    fn from(pinching: bool) -> Self {
        if pinching {
            GestureState::Pinching
        } else {
            GestureState::Open
        }
    }
}

/// Classifies thumb/index pairs against a fixed tolerance.
#[derive(Debug, Clone, Copy)]
pub struct PinchClassifier {
    tolerance: f64,
}

impl PinchClassifier {
    /// Tolerance used when none is configured, in video pixels.
    pub const DEFAULT_TOLERANCE: f64 = 40.0;

    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Classify two keypoints. Argument order does not matter.
    pub fn classify(&self, thumb: &Keypoint, index: &Keypoint) -> GestureState {
        is_pinching(thumb, index, self.tolerance).into()
    }

    /// Classify a hand. A hand missing either tip is never pinching.
    pub fn classify_hand(&self, hand: &Hand) -> GestureState {
        match (hand.thumb_tip(), hand.index_finger_tip()) {
            (Some(thumb), Some(index)) => self.classify(thumb, index),
            _ => GestureState::Open,
        }
    }
}

impl Default for PinchClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOLERANCE)
    }
}

/// Inclusive per-axis proximity test.
pub fn is_pinching(a: &Keypoint, b: &Keypoint, tolerance: f64) -> bool {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    dx <= tolerance && dy <= tolerance
}
