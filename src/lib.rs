//! MRZ Scanner - live camera scanning for two-line machine-readable zones
//!
//! Resolves the scan region against the display-oriented camera frame, feeds
//! throttled frames to an external label recognizer, accepts exactly two MRZ
//! lines per capture and holds the result for review until the user resets.

pub mod app;
pub mod capture;
pub mod config;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod shared;
pub mod storage;
pub mod vision;

pub use app::MrzScannerApp;
pub use config::AppConfig;
pub use pipeline::{FrameOutcome, FrameProcessor};
