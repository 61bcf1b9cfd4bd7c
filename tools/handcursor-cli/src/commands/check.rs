//! Validate the effective configuration.

use handcursor_common::clock::frame_period;
use handcursor_common::config::{config_file_path, AppConfig};
use handcursor_hand_model::CanvasGeometry;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("handcursor Configuration Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[INFO] No config file at {}, using defaults", path.display());
    }

    let pipeline = &config.pipeline;
    let valid = match config.validate() {
        Ok(()) => {
            println!("[OK] Configuration is valid");
            true
        }
        Err(e) => {
            println!("[FAIL] {e}");
            false
        }
    };

    let canvas = CanvasGeometry::new(
        pipeline.canvas_width,
        pipeline.canvas_height,
        pipeline.cursor_size,
    );
    let bounds = canvas.cursor_bounds();
    let (cam_w, cam_h) = config.camera.requested_size(pipeline);

    println!();
    println!(
        "  Canvas:        {}x{} (cursor {}px)",
        pipeline.canvas_width, pipeline.canvas_height, pipeline.cursor_size
    );
    println!(
        "  Cursor bounds: x [{:.1}, {:.1}], y [{:.1}, {:.1}]",
        bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max
    );
    println!(
        "  Mapping:       scale {} lerp {} pinch tolerance {}px",
        pipeline.scale_factor, pipeline.lerp_factor, pipeline.pinch_tolerance
    );
    println!(
        "  Clicks:        {:?}, overlay restored after {} ms",
        pipeline.click_mode, pipeline.click_restore_delay_ms
    );
    println!(
        "  Frame loop:    {} Hz ({:.1} ms per frame)",
        pipeline.refresh_rate_hz,
        frame_period(pipeline.refresh_rate_hz).as_secs_f64() * 1000.0
    );
    println!(
        "  Camera:        {}x{} @ {} fps, facing {:?}",
        cam_w, cam_h, config.camera.frame_rate, config.camera.facing
    );

    println!();
    if valid {
        println!("Configuration is ready.");
        Ok(())
    } else {
        anyhow::bail!("Configuration is invalid. See above for details.")
    }
}
