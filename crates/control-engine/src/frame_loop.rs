//! The per-run frame loop.
//!
//! One [`FrameLoop`] exists per session run. It owns the camera stream and
//! the detector for that run, and tears both down when it exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use handcursor_common::clock::{frame_period, RateController, SessionClock};
use handcursor_common::config::PipelineConfig;
use handcursor_gesture_core::{FrameOutput, GestureState, GesturePipeline};
use handcursor_hand_model::{Hand, Keypoint, Point2D, VideoDimensions};
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;

use crate::backend::{HandDetector, VideoHandle};
use crate::dispatch::ClickDispatcher;
use crate::overlay::{CursorStyle, Overlay};

/// Observable cursor state, published whenever the fingertip or gesture
/// changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CursorSnapshot {
    /// Number of evaluated frames in the current run.
    pub sequence: u64,
    pub fingertip: Option<Keypoint>,
    pub position: Point2D,
    pub gesture: GestureState,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Ticks that found the run still active.
    pub frames: u64,
    /// Detector calls that completed while the run was active.
    pub detections: u64,
    /// Frames that moved the cursor.
    pub hands_tracked: u64,
    pub frames_without_hand: u64,
    pub detector_errors: u64,
    /// Detections abandoned because the run stopped first.
    pub discarded_results: u64,
    pub clicks: u64,
    pub dispatch_errors: u64,
    pub render_errors: u64,
    pub tracks_released: u64,
}

enum Step<T> {
    Stop,
    Continue(T),
}

pub(crate) struct FrameLoop {
    detector: Box<dyn HandDetector>,
    video: Box<dyn VideoHandle>,
    pipeline: GesturePipeline,
    overlay: Arc<dyn Overlay>,
    dispatcher: ClickDispatcher,
    cursor_size: u32,
    refresh_rate_hz: u32,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    snapshots: Arc<watch::Sender<CursorSnapshot>>,
    clock: SessionClock,
    trace_rate: RateController,
    stats: LoopStats,
}

impl FrameLoop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: &PipelineConfig,
        detector: Box<dyn HandDetector>,
        video: Box<dyn VideoHandle>,
        overlay: Arc<dyn Overlay>,
        dispatcher: ClickDispatcher,
        running: Arc<AtomicBool>,
        stop: Arc<Notify>,
        snapshots: Arc<watch::Sender<CursorSnapshot>>,
    ) -> Self {
        Self {
            detector,
            video,
            pipeline: GesturePipeline::from_config(config),
            overlay,
            dispatcher,
            cursor_size: config.cursor_size,
            refresh_rate_hz: config.refresh_rate_hz,
            running,
            stop,
            snapshots,
            clock: SessionClock::start(),
            trace_rate: RateController::new(4),
            stats: LoopStats::default(),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run until the stop signal fires, then release everything.
    pub(crate) async fn run(mut self) -> LoopStats {
        let period = frame_period(self.refresh_rate_hz);
        tracing::info!(
            detector = self.detector.name(),
            period_ms = period.as_millis() as u64,
            epoch = self.clock.epoch_wall(),
            "Frame loop started"
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let tick = tokio::select! {
                biased;
                _ = self.stop.notified() => Step::Stop,
                _ = ticker.tick() => Step::Continue(()),
            };
            if matches!(tick, Step::Stop) || !self.is_running() {
                break;
            }
            self.stats.frames += 1;

            let Some(frame) = self.video.current_frame() else {
                continue;
            };
            let video = frame.dimensions;

            let detection = {
                let detector = &self.detector;
                let stop = &self.stop;
                tokio::select! {
                    biased;
                    _ = stop.notified() => Step::Stop,
                    result = detector.estimate_hands(&frame) => Step::Continue(result),
                }
            };
            let result = match detection {
                Step::Stop => {
                    self.stats.discarded_results += 1;
                    break;
                }
                Step::Continue(_) if !self.is_running() => {
                    self.stats.discarded_results += 1;
                    break;
                }
                Step::Continue(result) => result,
            };
            self.stats.detections += 1;

            match result {
                Ok(hands) => self.handle_hands(&hands, video),
                Err(e) => {
                    self.stats.detector_errors += 1;
                    tracing::warn!(error = %e, frame = frame.sequence, "Hand detection failed");
                }
            }
        }

        self.teardown();
        tracing::info!(
            frames = self.stats.frames,
            clicks = self.stats.clicks,
            discarded = self.stats.discarded_results,
            elapsed_secs = self.clock.elapsed_secs(),
            "Frame loop stopped"
        );
        self.stats
    }

    fn handle_hands(&mut self, hands: &[Hand], video: VideoDimensions) {
        let Some(output) = self.pipeline.process(hands, video) else {
            self.stats.frames_without_hand += 1;
            return;
        };
        self.stats.hands_tracked += 1;

        self.render(&output);
        if output.click {
            match self.dispatcher.dispatch(output.position) {
                Ok(_) => self.stats.clicks += 1,
                Err(e) => {
                    self.stats.dispatch_errors += 1;
                    tracing::warn!(error = %e, "Click dispatch failed");
                }
            }
        }
        self.publish(&output);

        if self.trace_rate.should_tick(self.clock.elapsed_ns()) {
            tracing::debug!(
                x = output.position.x,
                y = output.position.y,
                gesture = ?output.gesture,
                "Cursor update"
            );
        }
    }

    fn render(&mut self, output: &FrameOutput) {
        let style = CursorStyle::for_gesture(output.gesture, self.cursor_size);
        let drawn = self
            .overlay
            .clear()
            .and_then(|_| self.overlay.draw_cursor(output.position, &style));
        if let Err(e) = drawn {
            self.stats.render_errors += 1;
            tracing::warn!(error = %e, "Cursor render failed");
        }
    }

    fn publish(&self, output: &FrameOutput) {
        let sequence = self.stats.hands_tracked;
        self.snapshots.send_if_modified(|snapshot| {
            let changed = snapshot.fingertip.as_ref() != Some(&output.fingertip)
                || snapshot.gesture != output.gesture;
            if changed {
                *snapshot = CursorSnapshot {
                    sequence,
                    fingertip: Some(output.fingertip.clone()),
                    position: output.position,
                    gesture: output.gesture,
                };
            }
            changed
        });
    }

    fn teardown(&mut self) {
        let released = self.video.release();
        self.stats.tracks_released += released as u64;
        if let Err(e) = self.overlay.clear() {
            tracing::warn!(error = %e, "Failed to clear overlay");
        }
        if let Err(e) = self.dispatcher.close() {
            tracing::warn!(error = %e, "Failed to release overlay");
        }
        tracing::debug!(released, "Camera released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        CaptureRequest, ControlBackend, ReplayDetector, SimulatedBackend, SyntheticCamera,
    };
    use crate::overlay::FrameBufferOverlay;
    use crate::page::RecordingPage;
    use handcursor_common::config::CameraFacing;
    use handcursor_hand_model::{CanvasGeometry, DetectionRecord, HandLandmark};
    use std::time::Duration;

    fn record(x: f64, y: f64) -> DetectionRecord {
        DetectionRecord {
            timestamp_ns: 0,
            hands: vec![Hand::new(vec![
                Keypoint::named(HandLandmark::ThumbTip, x + 100.0, y),
                Keypoint::named(HandLandmark::IndexFingerTip, x, y),
            ])],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_draws_and_publishes_until_stopped() {
        let config = PipelineConfig::default();
        let camera = Arc::new(SyntheticCamera::new());
        let video = SimulatedBackend::new(camera.clone(), Vec::new())
            .acquire_camera(&CaptureRequest {
                width: 640,
                height: 480,
                frame_rate: 25,
                facing: CameraFacing::User,
            })
            .await
            .unwrap();
        let overlay = Arc::new(FrameBufferOverlay::new(CanvasGeometry::new(1280, 720, 25)));
        overlay.set_interactive(true).unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(Notify::new());
        let (tx, mut rx) = watch::channel(CursorSnapshot::default());
        let dispatcher = ClickDispatcher::new(
            overlay.clone(),
            Arc::new(RecordingPage::new()),
            Duration::from_millis(30),
            running.clone(),
        );
        let frame_loop = FrameLoop::new(
            &config,
            Box::new(ReplayDetector::new(vec![record(300.0, 200.0)])),
            video,
            overlay.clone(),
            dispatcher,
            running.clone(),
            stop.clone(),
            Arc::new(tx),
        );
        let task = tokio::spawn(frame_loop.run());

        rx.changed().await.unwrap();
        assert!(rx.borrow().fingertip.is_some());
        assert!(overlay.last_cursor().is_some());

        running.store(false, Ordering::SeqCst);
        stop.notify_one();
        let stats = task.await.unwrap();

        assert_eq!(stats.hands_tracked, 1);
        assert_eq!(stats.clicks, 0);
        assert_eq!(stats.tracks_released, 1);
        assert_eq!(camera.live_tracks(), 0);
        assert!(overlay.last_cursor().is_none());
        assert!(!overlay.is_interactive());
    }
}
