//! Replay recorded detections through a full control session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use handcursor_common::clock::frame_period;
use handcursor_common::config::{AppConfig, ClickMode};
use handcursor_common::error::HandcursorError;
use handcursor_control_engine::backend::{SimulatedBackend, SyntheticCamera};
use handcursor_control_engine::{ControlSession, FrameBufferOverlay, Overlay, RecordingPage};
use handcursor_hand_model::{parse_records, CanvasGeometry};

pub struct ReplayOptions {
    pub file: PathBuf,
    pub fps: Option<u32>,
    pub click_mode: Option<ClickMode>,
    pub latency_ms: u64,
    pub video_width: u32,
    pub video_height: u32,
}

pub async fn run(mut config: AppConfig, options: ReplayOptions) -> anyhow::Result<()> {
    if !options.file.exists() {
        return Err(HandcursorError::FileNotFound { path: options.file }.into());
    }
    let content = std::fs::read_to_string(&options.file)
        .with_context(|| format!("Failed to read {}", options.file.display()))?;
    let records = parse_records(&content).map_err(|e| HandcursorError::Replay {
        line: e.line,
        message: e.source.to_string(),
    })?;

    if let Some(fps) = options.fps {
        config.pipeline.refresh_rate_hz = fps;
    }
    if let Some(mode) = options.click_mode {
        config.pipeline.click_mode = mode;
    }
    let pipeline = config.pipeline.clone();

    println!("Replaying {} ({} records)", options.file.display(), records.len());
    println!("  Video: {}x{}", options.video_width, options.video_height);
    println!("  Frame loop: {} Hz", pipeline.refresh_rate_hz);
    println!("  Click mode: {:?}", pipeline.click_mode);
    if options.latency_ms > 0 {
        println!("  Detector latency: {} ms", options.latency_ms);
    }
    println!();

    let camera = Arc::new(SyntheticCamera::with_native_size(
        options.video_width,
        options.video_height,
    ));
    let mut backend = SimulatedBackend::new(camera.clone(), records);
    let latency = Duration::from_millis(options.latency_ms);
    if options.latency_ms > 0 {
        backend = backend.with_latency(latency);
    }
    let progress = backend.progress();

    let overlay = Arc::new(FrameBufferOverlay::new(CanvasGeometry::new(
        pipeline.canvas_width,
        pipeline.canvas_height,
        pipeline.cursor_size,
    )));
    let page = Arc::new(RecordingPage::new());
    let mut session =
        ControlSession::new(config, Arc::new(backend), overlay.clone(), page.clone());
    let mut cursor = session.subscribe();

    session.start().await?;

    let period = frame_period(pipeline.refresh_rate_hz);
    let mut poll = tokio::time::interval(period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let interrupted = loop {
        tokio::select! {
            _ = &mut ctrl_c => break true,
            _ = poll.tick() => {
                if progress.is_finished() {
                    break false;
                }
            }
            changed = cursor.changed() => {
                if changed.is_ok() {
                    let snapshot = cursor.borrow_and_update().clone();
                    tracing::debug!(
                        x = snapshot.position.x,
                        y = snapshot.position.y,
                        gesture = ?snapshot.gesture,
                        "Cursor moved"
                    );
                }
            }
        }
    };

    if !interrupted {
        // The last record is handed out before its frame is evaluated.
        tokio::time::sleep(latency + period * 2).await;
    }
    let final_cursor = overlay.last_cursor();
    let stats = session.stop().await?;

    println!("{}", if interrupted { "Interrupted." } else { "Replay complete." });
    println!("{}", serde_json::to_string_pretty(&stats)?);

    let clicks = page.clicks();
    println!();
    println!("Clicks: {}", clicks.len());
    for click in &clicks {
        println!("  ({:.1}, {:.1})", click.client_x, click.client_y);
    }
    if let Some((position, _)) = final_cursor {
        println!("Final cursor: ({:.2}, {:.2})", position.x, position.y);
    }
    println!("Camera tracks still live: {}", camera.live_tracks());
    if overlay.is_interactive() {
        tracing::warn!("Overlay still interactive after stop");
    }

    Ok(())
}
