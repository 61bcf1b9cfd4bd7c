//! handcursor Common Utilities
//!
//! Shared infrastructure for all handcursor crates:
//! - Error types and result aliases
//! - Session clock and rate control for the frame loop
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
