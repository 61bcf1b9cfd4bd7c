//! Cursor motion smoothing.
//!
//! Each frame moves the current position a fixed fraction of the way
//! toward the target: `current += (target - current) * factor`. Over a
//! stream of targets this is an exponential moving average.

use handcursor_hand_model::Point2D;

/// Linear interpolation between two scalars.
pub fn lerp(start: f64, end: f64, factor: f64) -> f64 {
    start + (end - start) * factor
}

/// Stateful single-pole smoother for the cursor position.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    factor: f64,
    current: Point2D,
}

impl CursorSmoother {
    /// Create a smoother resting at the origin.
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            current: Point2D::ORIGIN,
        }
    }

    /// Create a smoother resting at `position`.
    pub fn starting_at(position: Point2D, factor: f64) -> Self {
        Self {
            factor,
            current: position,
        }
    }

    /// Current smoothed position.
    pub fn position(&self) -> Point2D {
        self.current
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Advance one frame toward `target` and return the new position.
    pub fn step(&mut self, target: Point2D) -> Point2D {
        self.current = Point2D::new(
            lerp(self.current.x, target.x, self.factor),
            lerp(self.current.y, target.y, self.factor),
        );
        self.current
    }

    /// Return to the origin, as at the start of a session.
    pub fn reset(&mut self) {
        self.current = Point2D::ORIGIN;
    }
}
