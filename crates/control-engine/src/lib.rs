//! handcursor Control Engine
//!
//! Runs the gesture-to-cursor pipeline against live collaborators: a
//! camera, a hand-pose detector, the cursor overlay, and the page that
//! receives synthetic clicks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ControlSession                    │
//! │   IDLE ──start──▶ RUNNING ──stop/drop──▶ IDLE     │
//! │                      │                            │
//! │                      ▼                            │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │ FrameLoop (one tokio task per run)         │  │
//! │  │  tick ─▶ detect ─▶ evaluate ─▶ draw/click  │  │
//! │  └──┬──────────┬───────────┬───────────┬──────┘  │
//! │     ▼          ▼           ▼           ▼         │
//! │  VideoHandle  HandDetector  Overlay   PageTarget  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod dispatch;
pub mod frame_loop;
pub mod overlay;
pub mod page;
pub mod session;

pub use backend::{CaptureRequest, ControlBackend, HandDetector, VideoFrame, VideoHandle};
pub use frame_loop::{CursorSnapshot, LoopStats};
pub use overlay::{CursorStyle, FrameBufferOverlay, Overlay};
pub use page::{ClickEvent, PageTarget, RecordingPage};
pub use session::*;
