use std::sync::Arc;
use std::time::Duration;

use handcursor_common::config::AppConfig;
use handcursor_common::error::{HandcursorError, HandcursorResult};
use handcursor_control_engine::backend::{SimulatedBackend, SyntheticCamera};
use handcursor_control_engine::{
    CaptureRequest, ControlBackend, ControlSession, FrameBufferOverlay, HandDetector, Overlay,
    RecordingPage, SessionState, VideoHandle,
};
use handcursor_hand_model::{
    CanvasGeometry, DetectionRecord, Hand, HandLandmark, Keypoint, Point2D,
};

fn hand(thumb: (f64, f64), index: (f64, f64)) -> Hand {
    Hand::new(vec![
        Keypoint::named(HandLandmark::ThumbTip, thumb.0, thumb.1),
        Keypoint::named(HandLandmark::IndexFingerTip, index.0, index.1),
    ])
}

fn record(hands: Vec<Hand>) -> DetectionRecord {
    DetectionRecord {
        timestamp_ns: 0,
        hands,
    }
}

struct Rig {
    camera: Arc<SyntheticCamera>,
    overlay: Arc<FrameBufferOverlay>,
    page: Arc<RecordingPage>,
    session: ControlSession,
}

fn rig_with(
    camera: SyntheticCamera,
    backend: impl FnOnce(Arc<SyntheticCamera>) -> SimulatedBackend,
) -> Rig {
    let camera = Arc::new(camera);
    let overlay = Arc::new(
        FrameBufferOverlay::new(CanvasGeometry::new(1280, 720, 25))
            .with_origin(Point2D::new(100.0, 50.0)),
    );
    let page = Arc::new(RecordingPage::new());
    let session = ControlSession::new(
        AppConfig::default(),
        Arc::new(backend(camera.clone())),
        overlay.clone(),
        page.clone(),
    );
    Rig {
        camera,
        overlay,
        page,
        session,
    }
}

fn rig(records: Vec<DetectionRecord>) -> Rig {
    rig_with(SyntheticCamera::with_native_size(640, 480), |camera| {
        SimulatedBackend::new(camera, records)
    })
}

#[tokio::test(start_paused = true)]
async fn stop_releases_every_track() {
    let mut rig = rig(vec![record(vec![hand((200.0, 300.0), (320.0, 240.0))])]);

    rig.session.start().await.unwrap();
    assert_eq!(rig.camera.live_tracks(), 1);
    assert!(rig.overlay.is_interactive());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stats = rig.session.stop().await.unwrap();
    assert_eq!(stats.tracks_released, 1);
    assert_eq!(rig.camera.live_tracks(), 0);
    assert_eq!(rig.session.state(), SessionState::Idle);
    assert!(!rig.overlay.is_interactive());
    assert!(rig.overlay.last_cursor().is_none());
}

#[tokio::test(start_paused = true)]
async fn start_fails_without_camera() {
    for camera in [SyntheticCamera::unavailable(), SyntheticCamera::denied()] {
        let mut rig = rig_with(camera, |camera| SimulatedBackend::new(camera, Vec::new()));

        let err = rig.session.start().await.unwrap_err();
        assert!(err.is_capture_unavailable(), "{err}");
        assert_eq!(rig.session.state(), SessionState::Idle);
        assert_eq!(rig.camera.live_tracks(), 0);
        assert!(!rig.overlay.is_interactive());
    }
}

#[tokio::test(start_paused = true)]
async fn double_start_and_idle_stop_are_rejected() {
    let mut rig = rig(Vec::new());

    assert!(matches!(
        rig.session.stop().await,
        Err(HandcursorError::Session { .. })
    ));

    rig.session.start().await.unwrap();
    assert!(matches!(
        rig.session.start().await,
        Err(HandcursorError::Session { .. })
    ));
    assert_eq!(rig.camera.acquisitions(), 1);

    rig.session.stop().await.unwrap();
    assert_eq!(rig.camera.live_tracks(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_resets_cursor_to_origin() {
    // Fingertip in the top-left of a 640x480 frame maps far past the
    // top-right corner of the cursor range and is clamped to (615, -360).
    let mut rig = rig(vec![record(vec![hand((200.0, 300.0), (0.0, 0.0))])]);
    let mut rx = rig.session.subscribe();
    let expected = Point2D::new(0.15 * 615.0, 0.15 * -360.0);

    for _ in 0..2 {
        rig.session.start().await.unwrap();
        let snapshot = rx
            .wait_for(|s| s.fingertip.is_some())
            .await
            .unwrap()
            .clone();
        assert!((snapshot.position.x - expected.x).abs() < 1e-9, "{snapshot:?}");
        assert!((snapshot.position.y - expected.y).abs() < 1e-9, "{snapshot:?}");

        let (drawn, _) = rig.overlay.last_cursor().unwrap();
        assert_eq!(drawn, snapshot.position);

        rig.session.stop().await.unwrap();
    }
    assert_eq!(rig.camera.acquisitions(), 2);
    assert_eq!(rig.camera.live_tracks(), 0);
}

#[tokio::test(start_paused = true)]
async fn in_flight_detection_is_discarded_after_stop() {
    let pinch = record(vec![hand((320.0, 240.0), (330.0, 250.0))]);
    let mut rig = rig_with(SyntheticCamera::with_native_size(640, 480), |camera| {
        SimulatedBackend::new(camera, vec![pinch]).with_latency(Duration::from_millis(500))
    });

    rig.session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stats = rig.session.stop().await.unwrap();

    // Let the detection deadline pass; nothing may surface afterwards.
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(stats.discarded_results >= 1, "{stats:?}");
    assert_eq!(stats.hands_tracked, 0);
    assert_eq!(stats.clicks, 0);
    assert!(rig.page.clicks().is_empty());
    assert!(rig.overlay.last_cursor().is_none());
    assert!(rig.session.subscribe().borrow().fingertip.is_none());
    assert_eq!(rig.camera.live_tracks(), 0);
}

#[tokio::test(start_paused = true)]
async fn detector_error_does_not_stop_the_loop() {
    let records = vec![
        record(Vec::new()),
        record(vec![hand((100.0, 100.0), (320.0, 240.0))]),
    ];
    let mut rig = rig_with(SyntheticCamera::with_native_size(640, 480), |camera| {
        SimulatedBackend::new(camera, records).failing_on([0])
    });
    let mut rx = rig.session.subscribe();

    rig.session.start().await.unwrap();
    rx.wait_for(|s| s.fingertip.is_some()).await.unwrap();
    assert_eq!(rig.session.state(), SessionState::Running);

    let stats = rig.session.stop().await.unwrap();
    assert_eq!(stats.detector_errors, 1);
    assert_eq!(stats.hands_tracked, 1);
}

#[tokio::test(start_paused = true)]
async fn pinch_clicks_under_cursor_and_restores_overlay() {
    // Fingertip at the frame centre keeps the cursor at the canvas centre.
    let mut rig = rig(vec![record(vec![hand((330.0, 250.0), (320.0, 240.0))])]);
    let mut rx = rig.session.subscribe();

    rig.session.start().await.unwrap();
    rx.wait_for(|s| s.gesture.is_pinching()).await.unwrap();

    let clicks = rig.page.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!((clicks[0].client_x, clicks[0].client_y), (740.0, 410.0));
    assert!(!rig.overlay.is_interactive());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(rig.overlay.is_interactive());

    let stats = rig.session.stop().await.unwrap();
    assert_eq!(stats.clicks, 1);
    assert!(!rig.overlay.is_interactive());
}

/// Backend whose detector never loads.
struct NoDetectorBackend {
    inner: SimulatedBackend,
}

#[async_trait::async_trait]
impl ControlBackend for NoDetectorBackend {
    async fn acquire_camera(
        &self,
        request: &CaptureRequest,
    ) -> HandcursorResult<Box<dyn VideoHandle>> {
        self.inner.acquire_camera(request).await
    }

    async fn create_detector(&self) -> HandcursorResult<Box<dyn HandDetector>> {
        Err(HandcursorError::detector("model failed to load"))
    }

    fn name(&self) -> &str {
        "no-detector"
    }
}

#[tokio::test(start_paused = true)]
async fn detector_failure_releases_camera() {
    let camera = Arc::new(SyntheticCamera::new());
    let backend = NoDetectorBackend {
        inner: SimulatedBackend::new(camera.clone(), Vec::new()),
    };
    let overlay = Arc::new(FrameBufferOverlay::new(CanvasGeometry::new(1280, 720, 25)));
    let mut session = ControlSession::new(
        AppConfig::default(),
        Arc::new(backend),
        overlay.clone(),
        Arc::new(RecordingPage::new()),
    );

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, HandcursorError::Detector { .. }));
    assert_eq!(camera.acquisitions(), 1);
    assert_eq!(camera.live_tracks(), 0);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!overlay.is_interactive());
}
