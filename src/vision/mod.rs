//! Vision Layer
//!
//! Boundary to the external label recognition engine and the post-processing
//! that turns its output into the two MRZ lines.

pub mod aggregate;
pub mod invoker;
pub mod scripted;
pub mod snapshot;
pub mod types;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CapturedFrame;

pub use aggregate::{aggregate, flatten, is_acceptable, Aggregation, MRZ_LINE_COUNT};
pub use invoker::RecognitionInvoker;
pub use scripted::{ScriptedEngine, ScriptedResponse};
pub use snapshot::Snapshot;
pub use types::{
    CharacterResult, CustomModelConfig, LineResult, Point, RawEngineResult, RecognitionConfig,
    ResultGroup,
};

/// Failures reported by the recognition engine
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineError {
    #[error("recognition engine unavailable: {0}")]
    Unavailable(String),

    #[error("license rejected: {0}")]
    LicenseRejected(String),

    #[error("frame unreadable ({width}x{height})")]
    UnreadableFrame { width: u32, height: u32 },

    #[error("recognition failed: {0}")]
    Failed(String),
}

/// An external label recognizer.
///
/// Implementations are called from the frame thread, one frame at a time.
pub trait RecognitionEngine: Send + Sync {
    fn recognize(
        &self,
        frame: &CapturedFrame,
        config: &RecognitionConfig,
    ) -> Result<RawEngineResult, EngineError>;
}
