use std::sync::Arc;

use handcursor_common::config::{AppConfig, CameraFacing};
use handcursor_common::error::HandcursorResult;
use handcursor_hand_model::{Hand, VideoDimensions};

/// Parameters for acquiring a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
    /// Ideal frame rate; the device may deliver less.
    pub frame_rate: u32,
    pub facing: CameraFacing,
}

impl CaptureRequest {
    /// Build the request described by the configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let (width, height) = config.camera.requested_size(&config.pipeline);
        Self {
            width,
            height,
            frame_rate: config.camera.frame_rate,
            facing: config.camera.facing,
        }
    }
}

/// A single frame handed to the detector.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Monotonic frame number within the capture.
    pub sequence: u64,
    /// Nanoseconds since the capture was acquired.
    pub timestamp_ns: u64,
    pub dimensions: VideoDimensions,
    /// Packed RGB8 pixels; may be empty for sources without pixel data.
    pub data: Arc<[u8]>,
}

/// A live camera stream.
///
/// The holder owns every track of the stream and must call
/// [`VideoHandle::release`] to give the device back.
pub trait VideoHandle: Send {
    /// Dimensions frames are actually delivered at.
    fn dimensions(&self) -> VideoDimensions;

    /// Latest frame, or `None` if the stream has nothing to show yet.
    fn current_frame(&mut self) -> Option<VideoFrame>;

    /// Whether any track is still delivering frames.
    fn is_live(&self) -> bool;

    /// Stop every track. Returns the number of tracks that were stopped.
    fn release(&mut self) -> usize;
}

/// A hand-pose detector.
#[async_trait::async_trait]
pub trait HandDetector: Send + Sync {
    /// Detect hands in a frame. An empty list means no hand is visible.
    async fn estimate_hands(&self, frame: &VideoFrame) -> HandcursorResult<Vec<Hand>>;

    /// Detector name for logging.
    fn name(&self) -> &str;
}

/// Source of cameras and detectors for a control session.
///
/// A session asks for a fresh camera and a fresh detector on every start
/// and drops both on stop; nothing is cached between runs.
#[async_trait::async_trait]
pub trait ControlBackend: Send + Sync {
    /// Acquire a camera stream.
    ///
    /// Fails with `DeviceUnavailable` if there is no capture capability and
    /// with `PermissionDenied` if the user refused access.
    async fn acquire_camera(&self, request: &CaptureRequest)
        -> HandcursorResult<Box<dyn VideoHandle>>;

    /// Construct a detector, loading its model if necessary.
    async fn create_detector(&self) -> HandcursorResult<Box<dyn HandDetector>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

pub mod simulated;

pub use simulated::{ReplayDetector, ReplayProgress, SimulatedBackend, SyntheticCamera};

#[cfg(test)]
mod tests {
    use super::*;
    use handcursor_common::config::CameraConfig;

    #[test]
    fn test_capture_request_follows_canvas_by_default() {
        let config = AppConfig::default();
        let request = CaptureRequest::from_config(&config);
        assert_eq!((request.width, request.height), (1280, 720));
        assert_eq!(request.frame_rate, 25);
        assert_eq!(request.facing, CameraFacing::User);
    }

    #[test]
    fn test_capture_request_explicit_size() {
        let config = AppConfig {
            camera: CameraConfig {
                width: Some(640),
                height: Some(480),
                ..CameraConfig::default()
            },
            ..AppConfig::default()
        };
        let request = CaptureRequest::from_config(&config);
        assert_eq!((request.width, request.height), (640, 480));
    }
}
