//! Overlay Projection Layer
//!
//! Maps character geometry from the engine into marker points for the live
//! preview and for the cropped review snapshot. Projection is stateless; the
//! caller picks the coordinate space through the offset it passes.

pub mod render;
pub mod style;

use serde::{Deserialize, Serialize};

use crate::vision::{CharacterResult, LineResult};

pub use render::{annotate_frame, annotate_review};
pub use style::OverlayStyle;

/// Vertical nudge applied below the character baseline
pub const MARKER_BIAS: f32 = 4.0;

/// A single point marker under one character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f32,
    pub y: f32,
}

/// Coordinate space the engine reports character corners in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCoordinates {
    /// Relative to the top-left of the scan region
    #[default]
    RegionLocal,
    /// Relative to the top-left of the full frame
    FullFrame,
}

/// Which image the markers are drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionTarget {
    /// The full-frame live preview
    LiveFrame,
    /// The cropped snapshot shown for review
    CroppedSnapshot,
}

/// Offset to pass to [`project`] for a target, given where the engine's
/// coordinates are anchored and the region's full-frame offset
pub fn projection_offset(
    target: ProjectionTarget,
    coordinates: EngineCoordinates,
    crop_offset: (f32, f32),
) -> (f32, f32) {
    match (coordinates, target) {
        (EngineCoordinates::RegionLocal, ProjectionTarget::LiveFrame) => crop_offset,
        (EngineCoordinates::RegionLocal, ProjectionTarget::CroppedSnapshot) => (0.0, 0.0),
        (EngineCoordinates::FullFrame, ProjectionTarget::LiveFrame) => (0.0, 0.0),
        (EngineCoordinates::FullFrame, ProjectionTarget::CroppedSnapshot) => {
            (-crop_offset.0, -crop_offset.1)
        }
    }
}

/// Project characters with the default bias
pub fn project<'a>(
    characters: impl IntoIterator<Item = &'a CharacterResult>,
    offset_x: f32,
    offset_y: f32,
) -> Vec<Marker> {
    project_with_bias(characters, offset_x, offset_y, MARKER_BIAS)
}

/// One marker per character: x of the first corner, y of the fourth plus `bias`
pub fn project_with_bias<'a>(
    characters: impl IntoIterator<Item = &'a CharacterResult>,
    offset_x: f32,
    offset_y: f32,
    bias: f32,
) -> Vec<Marker> {
    characters
        .into_iter()
        .map(|c| Marker {
            x: c.corners[0].x + offset_x,
            y: c.corners[3].y + offset_y + bias,
        })
        .collect()
}

/// Project every character of every line, in line order
pub fn project_lines(lines: &[LineResult], offset: (f32, f32), bias: f32) -> Vec<Marker> {
    project_with_bias(
        lines.iter().flat_map(|line| line.characters.iter()),
        offset.0,
        offset.1,
        bias,
    )
}
