//! handcursor Gesture Core
//!
//! Turns per-frame hand detections into cursor motion and click intent:
//! - **Pinch:** Axis-aligned thumb/index proximity test
//! - **Mapping:** Mirrored, centred, amplified video-to-cursor transform with clamping
//! - **Smoothing:** Single-pole low-pass filter over the cursor position
//! - **Frame:** The per-frame evaluation that chains the three
//!
//! This crate is pure computation with no I/O or timers.
//! All inputs are data; all outputs are data.

pub mod frame;
pub mod mapping;
pub mod pinch;
pub mod smoothing;

pub use frame::{FrameOutput, GesturePipeline};
pub use mapping::CursorMapper;
pub use pinch::{GestureState, PinchClassifier};
pub use smoothing::CursorSmoother;
