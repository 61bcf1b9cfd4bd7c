//! Hand landmark types as produced by a hand-pose detector.
//!
//! A detector reports up to 21 keypoints per hand. Keypoints normally carry
//! their anatomical name; some runtimes omit it, in which case the
//! position in the keypoint list identifies the landmark.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The 21 anatomical hand landmarks, in canonical detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyFingerMcp,
    PinkyFingerPip,
    PinkyFingerDip,
    PinkyFingerTip,
}

impl HandLandmark {
    /// All landmarks in canonical order.
    pub const ALL: [HandLandmark; 21] = [
        HandLandmark::Wrist,
        HandLandmark::ThumbCmc,
        HandLandmark::ThumbMcp,
        HandLandmark::ThumbIp,
        HandLandmark::ThumbTip,
        HandLandmark::IndexFingerMcp,
        HandLandmark::IndexFingerPip,
        HandLandmark::IndexFingerDip,
        HandLandmark::IndexFingerTip,
        HandLandmark::MiddleFingerMcp,
        HandLandmark::MiddleFingerPip,
        HandLandmark::MiddleFingerDip,
        HandLandmark::MiddleFingerTip,
        HandLandmark::RingFingerMcp,
        HandLandmark::RingFingerPip,
        HandLandmark::RingFingerDip,
        HandLandmark::RingFingerTip,
        HandLandmark::PinkyFingerMcp,
        HandLandmark::PinkyFingerPip,
        HandLandmark::PinkyFingerDip,
        HandLandmark::PinkyFingerTip,
    ];

    /// Position of this landmark in a detector's keypoint list.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used by detectors for this landmark.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb_cmc",
            Self::ThumbMcp => "thumb_mcp",
            Self::ThumbIp => "thumb_ip",
            Self::ThumbTip => "thumb_tip",
            Self::IndexFingerMcp => "index_finger_mcp",
            Self::IndexFingerPip => "index_finger_pip",
            Self::IndexFingerDip => "index_finger_dip",
            Self::IndexFingerTip => "index_finger_tip",
            Self::MiddleFingerMcp => "middle_finger_mcp",
            Self::MiddleFingerPip => "middle_finger_pip",
            Self::MiddleFingerDip => "middle_finger_dip",
            Self::MiddleFingerTip => "middle_finger_tip",
            Self::RingFingerMcp => "ring_finger_mcp",
            Self::RingFingerPip => "ring_finger_pip",
            Self::RingFingerDip => "ring_finger_dip",
            Self::RingFingerTip => "ring_finger_tip",
            Self::PinkyFingerMcp => "pinky_finger_mcp",
            Self::PinkyFingerPip => "pinky_finger_pip",
            Self::PinkyFingerDip => "pinky_finger_dip",
            Self::PinkyFingerTip => "pinky_finger_tip",
        }
    }
}

impl fmt::Display for HandLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised landmark name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hand landmark: {0}")]
pub struct UnknownLandmark(pub String);

impl FromStr for HandLandmark {
    type Err = UnknownLandmark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandLandmark::ALL
            .into_iter()
            .find(|landmark| landmark.as_str() == s)
            .ok_or_else(|| UnknownLandmark(s.to_string()))
    }
}

/// A single detected keypoint in source-video pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal position, pixels from the left edge.
    pub x: f64,
    /// Vertical position, pixels from the top edge.
    pub y: f64,
    /// Relative depth, when the detector provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Landmark name, e.g. `index_finger_tip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    /// Create a named keypoint.
    pub fn named(landmark: HandLandmark, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            name: Some(landmark.as_str().to_string()),
        }
    }

    /// Create an unnamed keypoint.
    pub fn unnamed(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            name: None,
        }
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hand {
    /// Keypoints in detector order.
    pub keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    /// Detector confidence in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Hand {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            handedness: None,
            score: None,
        }
    }

    /// Look up a landmark by name, falling back to its canonical index
    /// when the keypoint at that index is unnamed.
    pub fn landmark(&self, landmark: HandLandmark) -> Option<&Keypoint> {
        let wanted = landmark.as_str();
        self.keypoints
            .iter()
            .find(|kp| kp.name.as_deref() == Some(wanted))
            .or_else(|| {
                self.keypoints
                    .get(landmark.index())
                    .filter(|kp| kp.name.is_none())
            })
    }

    /// The index fingertip, which drives the cursor.
    pub fn index_finger_tip(&self) -> Option<&Keypoint> {
        self.landmark(HandLandmark::IndexFingerTip)
    }

    /// The thumb tip, which together with the fingertip forms a pinch.
    pub fn thumb_tip(&self) -> Option<&Keypoint> {
        self.landmark(HandLandmark::ThumbTip)
    }
}
