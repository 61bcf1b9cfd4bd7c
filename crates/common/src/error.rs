//! Error types shared across handcursor crates.

use std::path::PathBuf;

/// Top-level error type for handcursor operations.
#[derive(Debug, thiserror::Error)]
pub enum HandcursorError {
    #[error("Capture device unavailable: {message}")]
    DeviceUnavailable { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Detector error: {message}")]
    Detector { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Dispatch error: {message}")]
    Dispatch { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Replay error at line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HandcursorError.
pub type HandcursorResult<T> = Result<T, HandcursorError>;

impl HandcursorError {
    pub fn device_unavailable(msg: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error means the camera could not be acquired at all.
    ///
    /// Such errors are fatal to a start attempt; the user has to retry.
    pub fn is_capture_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable { .. } | Self::PermissionDenied { .. }
        )
    }
}
