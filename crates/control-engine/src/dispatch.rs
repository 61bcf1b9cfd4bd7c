//! Synthetic click delivery through the overlay.
//!
//! While the overlay is interactive it would swallow the click, so every
//! dispatch makes it non-interactive first and schedules the restore.
//!
//! A restore and the end-of-run release both go through the run gate: the
//! run flag is read and the overlay written under one lock, so a restore can
//! never land after the run has released the overlay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use handcursor_common::error::HandcursorResult;
use handcursor_hand_model::Point2D;

use crate::overlay::Overlay;
use crate::page::{ClickEvent, PageTarget};

/// Delivers clicks to the page beneath the overlay.
#[derive(Clone)]
pub struct ClickDispatcher {
    overlay: Arc<dyn Overlay>,
    page: Arc<dyn PageTarget>,
    restore_delay: Duration,
    /// Run flag of the owning session run; restores are skipped once it
    /// is cleared.
    running: Arc<AtomicBool>,
    /// Serialises restores against [`ClickDispatcher::close`].
    gate: Arc<Mutex<()>>,
}

fn lock_gate(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    // The gate guards no data, so a poisoned lock is still usable.
    gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ClickDispatcher {
    pub fn new(
        overlay: Arc<dyn Overlay>,
        page: Arc<dyn PageTarget>,
        restore_delay: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            overlay,
            page,
            restore_delay,
            running,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// End the run: clear the run flag and make the overlay
    /// non-interactive. Restores that have not yet written are skipped.
    pub fn close(&self) -> HandcursorResult<()> {
        let _gate = lock_gate(&self.gate);
        self.running.store(false, Ordering::SeqCst);
        self.overlay.set_interactive(false)
    }

    /// Screen coordinates of a cursor-space position.
    pub fn screen_point(&self, position: Point2D) -> Point2D {
        let origin = self.overlay.origin();
        let canvas = self.overlay.geometry().to_canvas_pixels(&position);
        Point2D::new(origin.x + canvas.x, origin.y + canvas.y)
    }

    /// Click the page element under `position`.
    ///
    /// The overlay is made interactive again after the restore delay, but
    /// only if the run is still active by then. Must be called from within
    /// a tokio runtime.
    pub fn dispatch(&self, position: Point2D) -> HandcursorResult<ClickEvent> {
        self.overlay.set_interactive(false)?;

        let event = ClickEvent::at(self.screen_point(position));
        let delivered = self.page.dispatch_click(&event);
        self.schedule_restore();

        let hit = delivered?;
        tracing::debug!(
            x = event.client_x,
            y = event.client_y,
            hit,
            "Click dispatched"
        );
        Ok(event)
    }

    fn schedule_restore(&self) {
        let overlay = self.overlay.clone();
        let running = self.running.clone();
        let gate = self.gate.clone();
        let delay = self.restore_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _gate = lock_gate(&gate);
            if !running.load(Ordering::SeqCst) {
                return;
            }
            if let Err(e) = overlay.set_interactive(true) {
                tracing::warn!(error = %e, "Failed to restore overlay interactivity");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::FrameBufferOverlay;
    use crate::page::RecordingPage;
    use handcursor_hand_model::CanvasGeometry;

    fn fixture(running: bool) -> (Arc<FrameBufferOverlay>, Arc<RecordingPage>, ClickDispatcher) {
        let overlay = Arc::new(
            FrameBufferOverlay::new(CanvasGeometry::new(1280, 720, 25))
                .with_origin(Point2D::new(10.0, 20.0)),
        );
        overlay.set_interactive(true).unwrap();
        let page = Arc::new(RecordingPage::new());
        let dispatcher = ClickDispatcher::new(
            overlay.clone(),
            page.clone(),
            Duration::from_millis(30),
            Arc::new(AtomicBool::new(running)),
        );
        (overlay, page, dispatcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_lands_at_screen_coordinates() {
        let (_, page, dispatcher) = fixture(true);
        let event = dispatcher.dispatch(Point2D::new(-100.0, 50.0)).unwrap();

        assert_eq!((event.client_x, event.client_y), (550.0, 430.0));
        assert!(event.bubbles);
        assert_eq!(page.clicks(), vec![event]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlay_restored_after_delay() {
        let (overlay, _, dispatcher) = fixture(true);
        dispatcher.dispatch(Point2D::ORIGIN).unwrap();
        assert!(!overlay.is_interactive());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!overlay.is_interactive());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(overlay.is_interactive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_skipped_after_stop() {
        let (overlay, _, dispatcher) = fixture(true);
        dispatcher.dispatch(Point2D::ORIGIN).unwrap();
        dispatcher.running.store(false, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!overlay.is_interactive());
    }

    /// Overlay that stalls inside `set_interactive(true)` after announcing
    /// that the restore has started writing.
    struct StallingOverlay {
        inner: FrameBufferOverlay,
        restoring: Arc<tokio::sync::Notify>,
        stall: Duration,
    }

    impl Overlay for StallingOverlay {
        fn clear(&self) -> HandcursorResult<()> {
            self.inner.clear()
        }

        fn draw_cursor(
            &self,
            position: Point2D,
            style: &crate::overlay::CursorStyle,
        ) -> HandcursorResult<()> {
            self.inner.draw_cursor(position, style)
        }

        fn set_interactive(&self, interactive: bool) -> HandcursorResult<()> {
            if interactive {
                self.restoring.notify_one();
                std::thread::sleep(self.stall);
            }
            self.inner.set_interactive(interactive)
        }

        fn is_interactive(&self) -> bool {
            self.inner.is_interactive()
        }

        fn origin(&self) -> Point2D {
            self.inner.origin()
        }

        fn geometry(&self) -> CanvasGeometry {
            self.inner.geometry()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_during_restore_leaves_overlay_released() {
        let restoring = Arc::new(tokio::sync::Notify::new());
        let overlay = Arc::new(StallingOverlay {
            inner: FrameBufferOverlay::new(CanvasGeometry::new(1280, 720, 25)),
            restoring: restoring.clone(),
            stall: Duration::from_millis(100),
        });
        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = ClickDispatcher::new(
            overlay.clone(),
            Arc::new(RecordingPage::new()),
            Duration::from_millis(5),
            running.clone(),
        );

        dispatcher.dispatch(Point2D::ORIGIN).unwrap();
        // The restore has read the run flag and is mid-write.
        restoring.notified().await;

        let closer = dispatcher.clone();
        tokio::task::spawn_blocking(move || closer.close())
            .await
            .unwrap()
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!running.load(Ordering::SeqCst));
        assert!(!overlay.is_interactive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_skips_pending_restore() {
        let (overlay, _, dispatcher) = fixture(true);
        dispatcher.dispatch(Point2D::ORIGIN).unwrap();
        dispatcher.close().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!dispatcher.running.load(Ordering::SeqCst));
        assert!(!overlay.is_interactive());
    }
}
