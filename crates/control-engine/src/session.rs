//! Control session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use handcursor_common::config::AppConfig;
use handcursor_common::error::{HandcursorError, HandcursorResult};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::backend::{CaptureRequest, ControlBackend};
use crate::dispatch::ClickDispatcher;
use crate::frame_loop::{CursorSnapshot, FrameLoop, LoopStats};
use crate::overlay::Overlay;
use crate::page::PageTarget;

/// State of a control session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No camera held, no loop running.
    Idle,
    /// Camera acquired and the frame loop is active.
    Running,
}

/// Handles for the run in progress.
struct ActiveRun {
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    task: JoinHandle<LoopStats>,
}

impl ActiveRun {
    fn signal_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_one();
    }
}

/// A gesture control session.
///
/// Each `start` acquires a fresh camera and detector and spawns a frame
/// loop; `stop` tears them down again. Requires a tokio runtime.
pub struct ControlSession {
    config: AppConfig,
    backend: Arc<dyn ControlBackend>,
    overlay: Arc<dyn Overlay>,
    page: Arc<dyn PageTarget>,
    snapshots: Arc<watch::Sender<CursorSnapshot>>,
    run: Option<ActiveRun>,
    runs_started: u64,
}

impl ControlSession {
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn ControlBackend>,
        overlay: Arc<dyn Overlay>,
        page: Arc<dyn PageTarget>,
    ) -> Self {
        let (snapshots, _) = watch::channel(CursorSnapshot::default());
        Self {
            config,
            backend,
            overlay,
            page,
            snapshots: Arc::new(snapshots),
            run: None,
            runs_started: 0,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        match self.run {
            Some(_) => SessionState::Running,
            None => SessionState::Idle,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Number of successful starts over the session's lifetime.
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Watch the cursor state. Receivers stay valid across restarts.
    pub fn subscribe(&self) -> watch::Receiver<CursorSnapshot> {
        self.snapshots.subscribe()
    }

    /// Start tracking.
    ///
    /// Fails without side effects if the session is already running, the
    /// configuration is invalid, or no camera can be acquired. If the
    /// detector cannot be built the camera is released before returning.
    pub async fn start(&mut self) -> HandcursorResult<()> {
        if self.run.is_some() {
            return Err(HandcursorError::session("Session already running"));
        }
        self.config.validate()?;

        tracing::info!(backend = self.backend.name(), "Starting control session");

        let request = CaptureRequest::from_config(&self.config);
        let mut video = self.backend.acquire_camera(&request).await?;
        let video_size = video.dimensions();

        let detector = match self.backend.create_detector().await {
            Ok(detector) => detector,
            Err(e) => {
                let released = video.release();
                tracing::warn!(error = %e, released, "Detector unavailable, camera released");
                return Err(e);
            }
        };

        if let Err(e) = self.overlay.set_interactive(true) {
            video.release();
            return Err(e);
        }

        let running = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(Notify::new());
        let pipeline = &self.config.pipeline;
        let dispatcher = ClickDispatcher::new(
            self.overlay.clone(),
            self.page.clone(),
            Duration::from_millis(pipeline.click_restore_delay_ms),
            running.clone(),
        );

        self.snapshots.send_replace(CursorSnapshot::default());
        let frame_loop = FrameLoop::new(
            pipeline,
            detector,
            video,
            self.overlay.clone(),
            dispatcher,
            running.clone(),
            stop.clone(),
            self.snapshots.clone(),
        );
        let task = tokio::spawn(frame_loop.run());

        self.run = Some(ActiveRun {
            running,
            stop,
            task,
        });
        self.runs_started += 1;

        tracing::info!(
            width = video_size.width,
            height = video_size.height,
            run = self.runs_started,
            "Control session started"
        );
        Ok(())
    }

    /// Stop tracking and wait for the frame loop to release the camera.
    pub async fn stop(&mut self) -> HandcursorResult<LoopStats> {
        let run = self
            .run
            .take()
            .ok_or_else(|| HandcursorError::session("Session not running"))?;

        tracing::info!("Stopping control session");
        run.signal_stop();

        let stats = run
            .task
            .await
            .map_err(|e| HandcursorError::session(format!("Frame loop task failed: {e}")))?;

        tracing::info!(
            frames = stats.frames,
            clicks = stats.clicks,
            tracks_released = stats.tracks_released,
            "Control session stopped"
        );
        Ok(stats)
    }
}

impl Drop for ControlSession {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            tracing::debug!("Control session dropped while running");
            run.signal_stop();
        }
    }
}
