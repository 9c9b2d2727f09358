//! Shared state and messaging between the frame path and the UI path
//!
//! The two paths only meet at the [`ScanGate`] and the one-way
//! [`PipelineEvent`] channel.

pub mod gate;
pub mod messages;
pub mod state;

pub use gate::ScanGate;
pub use messages::{CaptureGeometry, CapturedScan, PipelineEvent, UiCommand};
pub use state::{copy_text, ReviewController, RuntimeStats, ScanSession};
