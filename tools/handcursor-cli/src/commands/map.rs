//! Show where a fingertip lands in cursor space.

use handcursor_common::config::AppConfig;
use handcursor_gesture_core::{CursorSmoother, GesturePipeline};
use handcursor_hand_model::{Keypoint, VideoDimensions};

pub fn run(
    config: &AppConfig,
    x: f64,
    y: f64,
    video_width: u32,
    video_height: u32,
) -> anyhow::Result<()> {
    config.pipeline.validate()?;

    let pipeline = GesturePipeline::from_config(&config.pipeline);
    let mapper = pipeline.mapper();
    let video = VideoDimensions::new(video_width, video_height);
    let fingertip = Keypoint::unnamed(x, y);

    let raw = mapper.raw_target(&fingertip, video);
    let target = mapper.target(&fingertip, video);
    let first_step = CursorSmoother::new(config.pipeline.lerp_factor).step(target);
    let canvas = mapper.bounds();

    println!("Fingertip ({x}, {y}) in a {video_width}x{video_height} video");
    println!("  Raw target:     ({:.2}, {:.2})", raw.x, raw.y);
    println!("  Clamped target: ({:.2}, {:.2})", target.x, target.y);
    println!(
        "  First step:     ({:.2}, {:.2})",
        first_step.x, first_step.y
    );
    println!(
        "  Bounds:         x [{:.1}, {:.1}], y [{:.1}, {:.1}]",
        canvas.x_min, canvas.x_max, canvas.y_min, canvas.y_max
    );
    if raw != target {
        println!("  (target was clamped to the canvas)");
    }

    Ok(())
}
