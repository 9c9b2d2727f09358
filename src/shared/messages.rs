//! Message types for hand-off between the frame path and the UI path

use uuid::Uuid;

use crate::geometry::{EffectiveFrameSize, PixelRect};
use crate::vision::{LineResult, Snapshot};

/// Frame geometry at the moment a result was committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureGeometry {
    /// Display-oriented frame size
    pub frame: EffectiveFrameSize,
    /// Scan region in full-frame pixels
    pub region: PixelRect,
    /// Region top-left corner in full-frame pixels
    pub crop_offset: (f32, f32),
}

/// An accepted scan, owned by the UI once committed
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedScan {
    pub id: Uuid,
    /// The MRZ lines, in engine order
    pub lines: Vec<LineResult>,
    /// Engine image of the processed region, if it sent one
    pub snapshot: Option<Snapshot>,
    pub geometry: CaptureGeometry,
}

/// Messages sent from the frame path to the UI path
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A result passed the gate and now belongs to the UI
    Committed(CapturedScan),
    /// The frame thread exited
    Stopped,
}

/// Commands issued by the review UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Close the review without copying
    Dismiss,
    /// Discard the result and scan again
    Rescan,
    /// Produce the clipboard text
    Copy,
}
