//! Camera Capture Layer
//!
//! The camera itself is an external collaborator. This module holds what the
//! scanner needs from it: frame buffers, format selection, the permission
//! signal, and the rate limiter in front of the per-frame path.

pub mod frame;

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::geometry::FrameSize;

pub use frame::CapturedFrame;

/// Resolution requested from the camera when the device offers it
pub const PREFERRED_RESOLUTION: FrameSize = FrameSize {
    width: 1280,
    height: 720,
};

/// Camera capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Frames per second admitted into recognition
    pub max_fps: u32,
    /// Preferred device format
    pub preferred_resolution: FrameSize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_fps: 1,
            preferred_resolution: PREFERRED_RESOLUTION,
        }
    }
}

/// A video format advertised by a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFormat {
    pub video_width: u32,
    pub video_height: u32,
}

impl CameraFormat {
    pub fn new(video_width: u32, video_height: u32) -> Self {
        Self {
            video_width,
            video_height,
        }
    }
}

/// Pick the first format matching the preferred resolution exactly.
/// `None` means the caller should let the platform choose its default.
pub fn select_format(formats: &[CameraFormat], preferred: FrameSize) -> Option<CameraFormat> {
    let selected = formats
        .iter()
        .find(|f| f.video_width == preferred.width && f.video_height == preferred.height)
        .copied();

    match selected {
        Some(format) => info!(
            "Selected camera format {}x{}",
            format.video_width, format.video_height
        ),
        None => debug!(
            "No {}x{} format among {} offered, using platform default",
            preferred.width,
            preferred.height,
            formats.len()
        ),
    }

    selected
}

/// Camera permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPermission {
    Granted,
    Denied,
}

impl CameraPermission {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Admits frames at no more than a fixed rate, by frame timestamp
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    min_interval: Duration,
    last_admitted: Option<Instant>,
}

impl FrameThrottle {
    /// Throttle to `max_fps` frames per second. Zero is treated as one.
    pub fn new(max_fps: u32) -> Self {
        let fps = max_fps.max(1);
        Self {
            min_interval: Duration::from_secs(1) / fps,
            last_admitted: None,
        }
    }

    /// Whether a frame captured at `timestamp` should be processed
    pub fn admit(&mut self, timestamp: Instant) -> bool {
        match self.last_admitted {
            Some(last) if timestamp.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_admitted = Some(timestamp);
                true
            }
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_preferred_format() {
        let formats = [
            CameraFormat::new(640, 480),
            CameraFormat::new(1280, 720),
            CameraFormat::new(1920, 1080),
        ];
        assert_eq!(
            select_format(&formats, PREFERRED_RESOLUTION),
            Some(CameraFormat::new(1280, 720))
        );
    }

    #[test]
    fn test_select_format_falls_back_to_platform_default() {
        let formats = [CameraFormat::new(720, 1280), CameraFormat::new(1920, 1080)];
        assert_eq!(select_format(&formats, PREFERRED_RESOLUTION), None);
        assert_eq!(select_format(&[], PREFERRED_RESOLUTION), None);
    }

    #[test]
    fn test_throttle_admits_one_frame_per_interval() {
        let mut throttle = FrameThrottle::new(1);
        let start = Instant::now();

        assert!(throttle.admit(start));
        assert!(!throttle.admit(start + Duration::from_millis(33)));
        assert!(!throttle.admit(start + Duration::from_millis(999)));
        assert!(throttle.admit(start + Duration::from_millis(1000)));
        assert!(!throttle.admit(start + Duration::from_millis(1500)));
        assert!(throttle.admit(start + Duration::from_millis(2100)));
    }

    #[test]
    fn test_throttle_zero_fps_is_one_fps() {
        let throttle = FrameThrottle::new(0);
        assert_eq!(throttle.min_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_capture_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.max_fps, 1);
        assert_eq!(config.preferred_resolution, FrameSize::new(1280, 720));
    }
}
