//! Colors and sizes for drawn overlays

use image::Rgba;

/// Style configuration for the region outline and character markers
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    /// Scan region outline color
    pub region_color: Rgba<u8>,
    /// Outline thickness in pixels
    pub region_stroke: u32,
    /// Character marker color
    pub marker_color: Rgba<u8>,
    /// Character marker radius in pixels
    pub marker_radius: i32,
    /// Vertical bias applied when projecting markers
    pub marker_bias: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            region_color: Rgba([255, 0, 0, 255]),
            region_stroke: 2,
            marker_color: Rgba([0, 0, 255, 255]),
            marker_radius: 1,
            marker_bias: super::MARKER_BIAS,
        }
    }
}
