//! Video-space to cursor-space mapping.
//!
//! The fingertip is mirrored horizontally (so motion matches a mirrored
//! self-view), re-centred on the frame centre and amplified by the scale
//! factor. The result is clamped so the cursor glyph stays on the canvas.

use handcursor_hand_model::{CanvasGeometry, CursorBounds, Keypoint, Point2D, VideoDimensions};

/// Maps fingertip positions to clamped cursor targets.
#[derive(Debug, Clone, Copy)]
pub struct CursorMapper {
    scale_factor: f64,
    bounds: CursorBounds,
}

impl CursorMapper {
    pub fn new(scale_factor: f64, canvas: CanvasGeometry) -> Self {
        Self {
            scale_factor,
            bounds: canvas.cursor_bounds(),
        }
    }

    pub fn bounds(&self) -> CursorBounds {
        self.bounds
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Mirrored, centred and scaled target, before clamping.
    pub fn raw_target(&self, fingertip: &Keypoint, video: VideoDimensions) -> Point2D {
        let center = video.center();
        Point2D::new(
            (center.x - fingertip.x) * self.scale_factor,
            (fingertip.y - center.y) * self.scale_factor,
        )
    }

    /// Target cursor position for a fingertip, clamped to the canvas.
    pub fn target(&self, fingertip: &Keypoint, video: VideoDimensions) -> Point2D {
        self.bounds.clamp(self.raw_target(fingertip, video))
    }
}
