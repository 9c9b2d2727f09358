//! Frame Geometry
//!
//! Converts the percentage-based scan region into pixel space for the
//! display-oriented frame. Platform branching lives only in
//! [`needs_rotation_correction`]; everything else is platform-agnostic math.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Frame size assumed before the camera has reported any dimensions
pub const DEFAULT_FRAME_SIZE: FrameSize = FrameSize {
    width: 1280,
    height: 720,
};

/// Host platform, as far as sensor orientation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Sensor frames are delivered in sensor orientation, not display orientation
    Android,
    /// Sensor frames are pre-rotated to display orientation
    Ios,
    /// Desktop cameras and anything else; treated as pre-rotated
    Other,
}

impl Platform {
    /// Platform of the current build target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// Orientation of the window the preview is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOrientation {
    Portrait,
    Landscape,
}

impl WindowOrientation {
    /// Derive orientation from window dimensions. Square windows count as portrait.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn from_portrait_flag(is_portrait: bool) -> Self {
        if is_portrait {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }

    pub fn is_landscape(self) -> bool {
        self == Self::Landscape
    }
}

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Strictly wider than tall. Square frames are not landscape.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn swapped(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Display-oriented frame size plus whether a rotation swap was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveFrameSize {
    pub width: u32,
    pub height: u32,
    pub rotated: bool,
}

impl EffectiveFrameSize {
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

/// Errors for scan region values that cannot describe a sub-rectangle of the frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("scan region field `{field}` must be within 0..=100, got {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("scan region overflows horizontally: left {left} + width {width} > 100")]
    HorizontalOverflow { left: f32, width: f32 },

    #[error("scan region overflows vertically: top {top} + height {height} > 100")]
    VerticalOverflow { top: f32, height: f32 },
}

/// Percentage-based sub-rectangle of the effective frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScanRegion", into = "RawScanRegion")]
pub struct ScanRegion {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

#[derive(Serialize, Deserialize)]
struct RawScanRegion {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl TryFrom<RawScanRegion> for ScanRegion {
    type Error = RegionError;

    fn try_from(raw: RawScanRegion) -> Result<Self, Self::Error> {
        ScanRegion::new(raw.left, raw.top, raw.width, raw.height)
    }
}

impl From<ScanRegion> for RawScanRegion {
    fn from(region: ScanRegion) -> Self {
        Self {
            left: region.left,
            top: region.top,
            width: region.width,
            height: region.height,
        }
    }
}

impl ScanRegion {
    /// Build a validated region. Each field is a percentage of the effective frame.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Result<Self, RegionError> {
        for (field, value) in [
            ("left", left),
            ("top", top),
            ("width", width),
            ("height", height),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(RegionError::OutOfRange { field, value });
            }
        }
        if left + width > 100.0 {
            return Err(RegionError::HorizontalOverflow { left, width });
        }
        if top + height > 100.0 {
            return Err(RegionError::VerticalOverflow { top, height });
        }
        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

impl Default for ScanRegion {
    /// A thin horizontal band across the middle of the frame, sized for two MRZ lines
    fn default() -> Self {
        Self {
            left: 5.0,
            top: 40.0,
            width: 90.0,
            height: 10.0,
        }
    }
}

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Whether raw sensor dimensions must be swapped to match the display orientation.
///
/// Only Android delivers frames in sensor orientation. There the frame is
/// rotated when its landscape-ness disagrees with the window's. Square frames
/// are never landscape, so a square frame in a landscape window is swapped
/// (a no-op on the numbers, but `rotated` is still reported).
pub fn needs_rotation_correction(
    platform: Platform,
    raw: FrameSize,
    window: WindowOrientation,
) -> bool {
    match platform {
        Platform::Android => raw.is_landscape() != window.is_landscape(),
        Platform::Ios | Platform::Other => false,
    }
}

/// Display-oriented size for a raw frame. Pure; no fallback handling.
pub fn effective_size(
    platform: Platform,
    raw: FrameSize,
    window: WindowOrientation,
) -> EffectiveFrameSize {
    let rotated = needs_rotation_correction(platform, raw, window);
    let size = if rotated { raw.swapped() } else { raw };
    EffectiveFrameSize {
        width: size.width,
        height: size.height,
        rotated,
    }
}

/// Pixel rectangle of `region` inside a frame of `size`
pub fn region_to_pixels(size: EffectiveFrameSize, region: &ScanRegion) -> PixelRect {
    let w = size.width as f32;
    let h = size.height as f32;
    let x = w * region.left / 100.0;
    let y = h * region.top / 100.0;
    PixelRect {
        x,
        y,
        width: (w * region.width / 100.0).min(w - x).max(0.0),
        height: (h * region.height / 100.0).min(h - y).max(0.0),
    }
}

/// Full-frame pixel offset of the region's top-left corner
pub fn crop_offset(size: EffectiveFrameSize, region: &ScanRegion) -> (f32, f32) {
    (
        size.width as f32 * region.left / 100.0,
        size.height as f32 * region.top / 100.0,
    )
}

/// SVG-style view box covering the whole effective frame
pub fn frame_view_box(size: EffectiveFrameSize) -> String {
    format!("0 0 {} {}", size.width, size.height)
}

/// SVG-style view box covering only the cropped region
pub fn cropped_view_box(size: EffectiveFrameSize, region: &ScanRegion) -> String {
    let rect = region_to_pixels(size, region);
    format!("0 0 {} {}", rect.width, rect.height)
}

/// Tracks raw frame size and window orientation, re-deriving the effective
/// size whenever either changes. Zero dimensions keep the last known size.
#[derive(Debug, Clone)]
pub struct FrameGeometryResolver {
    platform: Platform,
    raw: FrameSize,
    window: WindowOrientation,
    effective: EffectiveFrameSize,
}

impl FrameGeometryResolver {
    pub fn new(platform: Platform, window: WindowOrientation) -> Self {
        Self::with_initial_size(platform, window, DEFAULT_FRAME_SIZE)
    }

    pub fn with_initial_size(
        platform: Platform,
        window: WindowOrientation,
        initial: FrameSize,
    ) -> Self {
        let raw = if initial.is_valid() {
            initial
        } else {
            DEFAULT_FRAME_SIZE
        };
        Self {
            platform,
            raw,
            window,
            effective: effective_size(platform, raw, window),
        }
    }

    /// Resolve the effective size for a raw frame, updating the tracked state.
    /// Invalid (zero) dimensions fall back to the last known raw size.
    pub fn resolve(&mut self, raw_width: u32, raw_height: u32) -> EffectiveFrameSize {
        let candidate = FrameSize::new(raw_width, raw_height);
        if !candidate.is_valid() {
            debug!(
                "Ignoring degenerate frame size {}x{}, keeping {}x{}",
                raw_width, raw_height, self.raw.width, self.raw.height
            );
            return self.effective;
        }
        if candidate != self.raw {
            debug!(
                "Frame size changed {}x{} -> {}x{}",
                self.raw.width, self.raw.height, raw_width, raw_height
            );
            self.raw = candidate;
            self.effective = effective_size(self.platform, self.raw, self.window);
        }
        self.effective
    }

    /// Update the window orientation, re-deriving the effective size
    pub fn set_window_orientation(&mut self, window: WindowOrientation) -> EffectiveFrameSize {
        if window != self.window {
            self.window = window;
            self.effective = effective_size(self.platform, self.raw, self.window);
        }
        self.effective
    }

    pub fn effective(&self) -> EffectiveFrameSize {
        self.effective
    }

    pub fn raw(&self) -> FrameSize {
        self.raw
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn region_to_pixels(&self, region: &ScanRegion) -> PixelRect {
        region_to_pixels(self.effective, region)
    }

    pub fn crop_offset(&self, region: &ScanRegion) -> (f32, f32) {
        crop_offset(self.effective, region)
    }
}
