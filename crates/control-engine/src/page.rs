//! Page-side receiver of synthetic clicks.

use std::sync::Mutex;

use handcursor_common::error::{HandcursorError, HandcursorResult};
use handcursor_hand_model::Point2D;

/// A synthetic click at screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub client_x: f64,
    pub client_y: f64,
    /// Propagate to ancestors of the target element.
    pub bubbles: bool,
    pub cancelable: bool,
}

impl ClickEvent {
    pub fn at(point: Point2D) -> Self {
        Self {
            client_x: point.x,
            client_y: point.y,
            bubbles: true,
            cancelable: true,
        }
    }
}

/// Whatever lies beneath the overlay.
pub trait PageTarget: Send + Sync {
    /// Deliver a click to the element under the event's coordinates.
    ///
    /// Returns `true` if an element received it. The pipeline does not
    /// depend on the answer.
    fn dispatch_click(&self, event: &ClickEvent) -> HandcursorResult<bool>;
}

/// Page that keeps every click it receives.
#[derive(Debug, Default)]
pub struct RecordingPage {
    clicks: Mutex<Vec<ClickEvent>>,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> Vec<ClickEvent> {
        self.clicks
            .lock()
            .map(|clicks| clicks.clone())
            .unwrap_or_default()
    }
}

impl PageTarget for RecordingPage {
    fn dispatch_click(&self, event: &ClickEvent) -> HandcursorResult<bool> {
        tracing::debug!(x = event.client_x, y = event.client_y, "Page received click");
        self.clicks
            .lock()
            .map_err(|_| HandcursorError::dispatch("click log poisoned"))?
            .push(*event);
        Ok(true)
    }
}
