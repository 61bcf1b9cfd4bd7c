//! handcursor Hand Model
//!
//! Defines the data contracts shared by the pipeline crates:
//! - **Landmarks:** Named hand keypoints in source-video pixel space
//! - **Geometry:** Points, video dimensions, and cursor-space bounds
//! - **Records:** Timestamped detector output in JSONL form, for replay
//!
//! Video coordinates have their origin at the top-left of the frame with
//! y pointing down. Cursor coordinates are centred on the overlay canvas.

pub mod geometry;
pub mod landmark;
pub mod record;

pub use geometry::*;
pub use landmark::*;
pub use record::*;
