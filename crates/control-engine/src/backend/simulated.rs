//! In-process backend: a synthetic camera and a detector that replays
//! recorded detections.
//!
//! Used by the CLI `replay` command and by tests. The camera keeps a handle
//! on every track it has issued so callers can verify that sessions give
//! the device back.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use handcursor_common::clock::SessionClock;
use handcursor_common::error::{HandcursorError, HandcursorResult};
use handcursor_hand_model::{DetectionRecord, Hand, VideoDimensions};

use super::{CaptureRequest, ControlBackend, HandDetector, VideoFrame, VideoHandle};

/// How a synthetic camera answers acquisition requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraAvailability {
    Available,
    NoDevice,
    Denied,
}

/// Synthetic camera that delivers blank frames at the requested size.
#[derive(Debug)]
pub struct SyntheticCamera {
    availability: CameraAvailability,
    /// Delivered size; `None` honours the request.
    native_size: Option<VideoDimensions>,
    tracks: Mutex<Vec<Arc<AtomicBool>>>,
    acquisitions: AtomicUsize,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            availability: CameraAvailability::Available,
            native_size: None,
            tracks: Mutex::new(Vec::new()),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// A camera that delivers a fixed size regardless of the request.
    pub fn with_native_size(width: u32, height: u32) -> Self {
        Self {
            native_size: Some(VideoDimensions::new(width, height)),
            ..Self::new()
        }
    }

    /// A host with no capture capability.
    pub fn unavailable() -> Self {
        Self {
            availability: CameraAvailability::NoDevice,
            ..Self::new()
        }
    }

    /// A host where the user refuses camera access.
    pub fn denied() -> Self {
        Self {
            availability: CameraAvailability::Denied,
            ..Self::new()
        }
    }

    /// Number of successful acquisitions so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of issued tracks that have not been stopped.
    pub fn live_tracks(&self) -> usize {
        self.tracks
            .lock()
            .map(|tracks| tracks.iter().filter(|t| t.load(Ordering::SeqCst)).count())
            .unwrap_or(0)
    }

    fn acquire(&self, request: &CaptureRequest) -> HandcursorResult<SyntheticVideo> {
        match self.availability {
            CameraAvailability::NoDevice => {
                return Err(HandcursorError::device_unavailable(
                    "no media capture capability on this host",
                ))
            }
            CameraAvailability::Denied => {
                return Err(HandcursorError::permission_denied(
                    "camera access was refused",
                ))
            }
            CameraAvailability::Available => {}
        }

        let dimensions = self
            .native_size
            .unwrap_or_else(|| VideoDimensions::new(request.width, request.height));
        let track = Arc::new(AtomicBool::new(true));
        self.tracks
            .lock()
            .map_err(|_| HandcursorError::device_unavailable("camera track registry poisoned"))?
            .push(track.clone());
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let pixels = dimensions.width as usize * dimensions.height as usize * 3;
        Ok(SyntheticVideo {
            dimensions,
            tracks: vec![track],
            blank: Arc::from(vec![0u8; pixels]),
            sequence: 0,
            clock: SessionClock::start(),
        })
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Live stream from a [`SyntheticCamera`].
struct SyntheticVideo {
    dimensions: VideoDimensions,
    tracks: Vec<Arc<AtomicBool>>,
    blank: Arc<[u8]>,
    sequence: u64,
    /// Frames are stamped against the acquisition epoch.
    clock: SessionClock,
}

impl VideoHandle for SyntheticVideo {
    fn dimensions(&self) -> VideoDimensions {
        self.dimensions
    }

    fn current_frame(&mut self) -> Option<VideoFrame> {
        if !self.is_live() {
            return None;
        }
        self.sequence += 1;
        Some(VideoFrame {
            sequence: self.sequence,
            timestamp_ns: self.clock.elapsed_ns(),
            dimensions: self.dimensions,
            data: self.blank.clone(),
        })
    }

    fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.load(Ordering::SeqCst))
    }

    fn release(&mut self) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.swap(false, Ordering::SeqCst))
            .count()
    }
}

/// Shared view of how far a replay has progressed.
#[derive(Debug, Clone, Default)]
pub struct ReplayProgress {
    served: Arc<AtomicUsize>,
    total: usize,
}

impl ReplayProgress {
    /// Detection calls answered so far in the current run.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every record has been handed out.
    pub fn is_finished(&self) -> bool {
        self.served() >= self.total
    }
}

/// Detector that answers each call with the next recorded detection.
///
/// Once the records run out every call returns no hands.
pub struct ReplayDetector {
    records: Arc<[DetectionRecord]>,
    served: Arc<AtomicUsize>,
    latency: Option<Duration>,
    failing_calls: HashSet<usize>,
}

impl ReplayDetector {
    pub fn new(records: impl Into<Arc<[DetectionRecord]>>) -> Self {
        Self {
            records: records.into(),
            served: Arc::new(AtomicUsize::new(0)),
            latency: None,
            failing_calls: HashSet::new(),
        }
    }

    /// Delay every answer, as a slow inference would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the given zero-based calls instead of answering them.
    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls.extend(calls);
        self
    }

    pub fn progress(&self) -> ReplayProgress {
        ReplayProgress {
            served: self.served.clone(),
            total: self.records.len(),
        }
    }
}

#[async_trait::async_trait]
impl HandDetector for ReplayDetector {
    async fn estimate_hands(&self, frame: &VideoFrame) -> HandcursorResult<Vec<Hand>> {
        let call = self.served.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing_calls.contains(&call) {
            return Err(HandcursorError::detector(format!(
                "scripted failure on frame {}",
                frame.sequence
            )));
        }
        Ok(self
            .records
            .get(call)
            .map(|record| record.hands.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Backend pairing a [`SyntheticCamera`] with a [`ReplayDetector`].
///
/// Every `create_detector` call starts the replay from the first record.
pub struct SimulatedBackend {
    camera: Arc<SyntheticCamera>,
    records: Arc<[DetectionRecord]>,
    latency: Option<Duration>,
    failing_calls: Vec<usize>,
    served: Arc<AtomicUsize>,
}

impl SimulatedBackend {
    pub fn new(camera: Arc<SyntheticCamera>, records: Vec<DetectionRecord>) -> Self {
        Self {
            camera,
            records: records.into(),
            latency: None,
            failing_calls: Vec::new(),
            served: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls.extend(calls);
        self
    }

    pub fn camera(&self) -> &Arc<SyntheticCamera> {
        &self.camera
    }

    /// Progress of the detector created by the most recent start.
    pub fn progress(&self) -> ReplayProgress {
        ReplayProgress {
            served: self.served.clone(),
            total: self.records.len(),
        }
    }
}

#[async_trait::async_trait]
impl ControlBackend for SimulatedBackend {
    async fn acquire_camera(
        &self,
        request: &CaptureRequest,
    ) -> HandcursorResult<Box<dyn VideoHandle>> {
        let video = self.camera.acquire(request)?;
        tracing::info!(
            width = video.dimensions.width,
            height = video.dimensions.height,
            frame_rate = request.frame_rate,
            "Synthetic camera acquired"
        );
        Ok(Box::new(video))
    }

    async fn create_detector(&self) -> HandcursorResult<Box<dyn HandDetector>> {
        self.served.store(0, Ordering::SeqCst);
        let mut detector = ReplayDetector::new(self.records.clone())
            .failing_on(self.failing_calls.iter().copied());
        detector.served = self.served.clone();
        if let Some(latency) = self.latency {
            detector = detector.with_latency(latency);
        }
        tracing::info!(records = self.records.len(), "Replay detector ready");
        Ok(Box::new(detector))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
