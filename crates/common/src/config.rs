//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HandcursorError, HandcursorResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gesture-to-cursor pipeline tuning.
    pub pipeline: PipelineConfig,

    /// Camera capture request.
    pub camera: CameraConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Tuning for the gesture-to-cursor pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Overlay canvas width in pixels.
    pub canvas_width: u32,

    /// Overlay canvas height in pixels.
    pub canvas_height: u32,

    /// Side length of the cursor glyph in pixels.
    pub cursor_size: u32,

    /// Motion amplification from video space to cursor space.
    pub scale_factor: f64,

    /// Interpolation factor applied each frame, in (0, 1].
    pub lerp_factor: f64,

    /// Per-axis thumb/index distance (video pixels) that counts as a pinch.
    pub pinch_tolerance: f64,

    /// How long the overlay stays non-interactive after a synthetic click.
    pub click_restore_delay_ms: u64,

    /// When pinching produces clicks.
    pub click_mode: ClickMode,

    /// Frame loop rate, standing in for the display refresh.
    pub refresh_rate_hz: u32,
}

/// When a pinch produces a synthetic click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Every frame spent pinching dispatches a click.
    #[default]
    Continuous,
    /// Only the frame that enters the pinch dispatches a click.
    OnEnter,
}

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    #[default]
    User,
    Environment,
}

/// Camera capture request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Requested frame width; `None` requests the canvas width.
    pub width: Option<u32>,

    /// Requested frame height; `None` requests the canvas height.
    pub height: Option<u32>,

    /// Ideal capture frame rate.
    pub frame_rate: u32,

    /// Preferred camera.
    pub facing: CameraFacing,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "handcursor=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1280,
            canvas_height: 720,
            cursor_size: 25,
            scale_factor: 6.0,
            lerp_factor: 0.15,
            pinch_tolerance: 40.0,
            click_restore_delay_ms: 30,
            click_mode: ClickMode::Continuous,
            refresh_rate_hz: 60,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            frame_rate: 25,
            facing: CameraFacing::User,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl PipelineConfig {
    /// Check that every tuning value is usable by the pipeline.
    pub fn validate(&self) -> HandcursorResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(HandcursorError::config("canvas dimensions must be non-zero"));
        }
        if self.cursor_size >= self.canvas_width.min(self.canvas_height) {
            return Err(HandcursorError::config(format!(
                "cursor size {} does not fit a {}x{} canvas",
                self.cursor_size, self.canvas_width, self.canvas_height
            )));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(HandcursorError::config("scale_factor must be positive"));
        }
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err(HandcursorError::config("lerp_factor must be in (0, 1]"));
        }
        if !(self.pinch_tolerance.is_finite() && self.pinch_tolerance >= 0.0) {
            return Err(HandcursorError::config(
                "pinch_tolerance must be a non-negative number",
            ));
        }
        if self.refresh_rate_hz == 0 {
            return Err(HandcursorError::config("refresh_rate_hz must be non-zero"));
        }
        Ok(())
    }
}

impl CameraConfig {
    /// Effective capture size; unset axes follow the canvas.
    pub fn requested_size(&self, pipeline: &PipelineConfig) -> (u32, u32) {
        (
            self.width.unwrap_or(pipeline.canvas_width),
            self.height.unwrap_or(pipeline.canvas_height),
        )
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Validate all sections.
    pub fn validate(&self) -> HandcursorResult<()> {
        self.pipeline.validate()?;
        if self.camera.frame_rate == 0 {
            return Err(HandcursorError::config("camera frame_rate must be non-zero"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("handcursor").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.cursor_size, 25);
        assert_eq!(config.pipeline.click_restore_delay_ms, 30);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"pipeline":{"scale_factor":4.0,"click_mode":"on_enter"}}"#)
                .unwrap();
        assert_eq!(config.pipeline.scale_factor, 4.0);
        assert_eq!(config.pipeline.click_mode, ClickMode::OnEnter);
        assert_eq!(config.pipeline.lerp_factor, 0.15);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_bad_lerp_factor() {
        let mut pipeline = PipelineConfig::default();
        pipeline.lerp_factor = 0.0;
        assert!(pipeline.validate().is_err());
        pipeline.lerp_factor = 1.5;
        assert!(pipeline.validate().is_err());
        pipeline.lerp_factor = 1.0;
        assert!(pipeline.validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_cursor() {
        let pipeline = PipelineConfig {
            canvas_width: 20,
            canvas_height: 20,
            ..PipelineConfig::default()
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn test_camera_size_follows_canvas() {
        let pipeline = PipelineConfig::default();
        let camera = CameraConfig {
            height: Some(480),
            ..CameraConfig::default()
        };
        assert_eq!(camera.requested_size(&pipeline), (1280, 480));
    }
}
