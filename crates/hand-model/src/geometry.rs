//! Geometry types for video space and cursor space.
//!
//! Cursor space is centred on the overlay canvas: `(0.0, 0.0)` is the
//! canvas centre, x grows to the right and y grows downwards. A cursor
//! position names the top-left corner of the cursor glyph.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// The cursor-space origin (canvas centre).
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Pixel dimensions of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Centre of the frame in video pixels.
    pub fn center(&self) -> Point2D {
        Point2D::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// The overlay canvas and the cursor glyph that moves across it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
    pub cursor_size: u32,
}

impl CanvasGeometry {
    pub fn new(width: u32, height: u32, cursor_size: u32) -> Self {
        Self {
            width,
            height,
            cursor_size,
        }
    }

    /// Range a cursor position may take so the glyph stays on the canvas.
    pub fn cursor_bounds(&self) -> CursorBounds {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let size = self.cursor_size as f64;
        CursorBounds {
            x_min: -half_w,
            x_max: half_w - size,
            y_min: -half_h,
            y_max: half_h - size,
        }
    }

    /// Convert a cursor-space position into canvas pixel coordinates
    /// (origin top-left).
    pub fn to_canvas_pixels(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            p.x + self.width as f64 / 2.0,
            p.y + self.height as f64 / 2.0,
        )
    }
}

/// Inclusive bounds for cursor positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl CursorBounds {
    /// Clamp a point into the bounds, one axis at a time.
    pub fn clamp(&self, p: Point2D) -> Point2D {
        Point2D::new(
            p.x.max(self.x_min).min(self.x_max),
            p.y.max(self.y_min).min(self.y_max),
        )
    }

    /// Check if a point is within the bounds.
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}
