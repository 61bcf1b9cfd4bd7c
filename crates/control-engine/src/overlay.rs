//! Cursor overlay drawing surface.
//!
//! The overlay sits above the page. While interactive it intercepts
//! pointer input; a synthetic click has to be dispatched while it is not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use handcursor_common::error::{HandcursorError, HandcursorResult};
use handcursor_gesture_core::GestureState;
use handcursor_hand_model::{CanvasGeometry, Point2D};

/// Cursor colour while the hand is open (0x00RRGGBB).
pub const OPEN_COLOR: u32 = 0x0000_8000;
/// Cursor colour while pinching (0x00RRGGBB).
pub const PINCH_COLOR: u32 = 0x00FF_0000;
/// Radius of the pointer dot under the glyph.
pub const POINTER_RADIUS: i32 = 3;

/// How to draw the cursor for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorStyle {
    pub color: u32,
    pub size: u32,
}

impl CursorStyle {
    pub fn for_gesture(gesture: GestureState, size: u32) -> Self {
        let color = match gesture {
            GestureState::Open => OPEN_COLOR,
            GestureState::Pinching => PINCH_COLOR,
        };
        Self { color, size }
    }
}

/// Drawing surface for the cursor.
///
/// Positions are in cursor space (centred on the canvas). Methods take
/// `&self` so the surface can be shared with delayed restore tasks.
pub trait Overlay: Send + Sync {
    /// Erase everything drawn so far.
    fn clear(&self) -> HandcursorResult<()>;

    /// Draw the cursor glyph with its top-left corner at `position`.
    fn draw_cursor(&self, position: Point2D, style: &CursorStyle) -> HandcursorResult<()>;

    /// Make the overlay intercept pointer input (`true`) or let it pass
    /// through to the page (`false`).
    fn set_interactive(&self, interactive: bool) -> HandcursorResult<()>;

    fn is_interactive(&self) -> bool;

    /// Screen position of the canvas's top-left corner.
    fn origin(&self) -> Point2D;

    fn geometry(&self) -> CanvasGeometry;
}

/// A 0x00RRGGBB pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[y * self.width + x] = color;
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        for py in y..y + h {
            for px in x..x + w {
                self.put_pixel(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// Software overlay that renders into an in-memory framebuffer.
#[derive(Debug)]
pub struct FrameBufferOverlay {
    geometry: CanvasGeometry,
    origin: Point2D,
    buffer: Mutex<FrameBuffer>,
    last_cursor: Mutex<Option<(Point2D, CursorStyle)>>,
    interactive: AtomicBool,
}

impl FrameBufferOverlay {
    pub fn new(geometry: CanvasGeometry) -> Self {
        Self {
            geometry,
            origin: Point2D::ORIGIN,
            buffer: Mutex::new(FrameBuffer::new(
                geometry.width as usize,
                geometry.height as usize,
            )),
            last_cursor: Mutex::new(None),
            interactive: AtomicBool::new(false),
        }
    }

    /// Place the canvas at a screen offset.
    pub fn with_origin(mut self, origin: Point2D) -> Self {
        self.origin = origin;
        self
    }

    /// Copy of the current pixels.
    pub fn snapshot(&self) -> HandcursorResult<FrameBuffer> {
        Ok(self.lock_buffer()?.clone())
    }

    /// The cursor drawn since the last clear, if any.
    pub fn last_cursor(&self) -> Option<(Point2D, CursorStyle)> {
        self.last_cursor.lock().ok().and_then(|c| *c)
    }

    fn lock_buffer(&self) -> HandcursorResult<std::sync::MutexGuard<'_, FrameBuffer>> {
        self.buffer
            .lock()
            .map_err(|_| HandcursorError::render("overlay framebuffer poisoned"))
    }

    fn set_last_cursor(&self, cursor: Option<(Point2D, CursorStyle)>) -> HandcursorResult<()> {
        let mut last = self
            .last_cursor
            .lock()
            .map_err(|_| HandcursorError::render("overlay cursor state poisoned"))?;
        *last = cursor;
        Ok(())
    }
}

impl Overlay for FrameBufferOverlay {
    fn clear(&self) -> HandcursorResult<()> {
        self.lock_buffer()?.clear();
        self.set_last_cursor(None)
    }

    fn draw_cursor(&self, position: Point2D, style: &CursorStyle) -> HandcursorResult<()> {
        let top_left = self.geometry.to_canvas_pixels(&position);
        let x = top_left.x.round() as i32;
        let y = top_left.y.round() as i32;
        let size = style.size as i32;
        {
            let mut buffer = self.lock_buffer()?;
            buffer.fill_rect(x, y, size, size, style.color);
            buffer.fill_circle(x, y + size, POINTER_RADIUS, style.color);
        }
        self.set_last_cursor(Some((position, *style)))
    }

    fn set_interactive(&self, interactive: bool) -> HandcursorResult<()> {
        self.interactive.store(interactive, Ordering::SeqCst);
        Ok(())
    }

    fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::SeqCst)
    }

    fn origin(&self) -> Point2D {
        self.origin
    }

    fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }
}
