//! Frame data structures for camera frames

use std::time::Instant;

use crate::geometry::FrameSize;

/// A frame delivered by the camera
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels (sensor orientation)
    pub width: u32,
    /// Frame height in pixels (sensor orientation)
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame stamped with the current time
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::with_timestamp(data, width, height, Instant::now())
    }

    /// Create a frame with an explicit capture timestamp
    pub fn with_timestamp(data: Vec<u8>, width: u32, height: u32, timestamp: Instant) -> Self {
        Self {
            data,
            width,
            height,
            timestamp,
        }
    }

    /// Blank opaque frame, used when replaying without real camera input
    pub fn blank(width: u32, height: u32, timestamp: Instant) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        let mut data = vec![0u8; len];
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        Self::with_timestamp(data, width, height, timestamp)
    }

    /// Get frame dimensions
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Whether the pixel buffer matches the declared dimensions
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_is_well_formed() {
        let frame = CapturedFrame::blank(4, 2, Instant::now());
        assert!(frame.is_well_formed());
        assert_eq!(frame.size(), FrameSize::new(4, 2));
        assert!(frame.data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_mismatched_buffer_is_not_well_formed() {
        let frame = CapturedFrame::new(vec![0; 10], 4, 2);
        assert!(!frame.is_well_formed());

        let frame = CapturedFrame::new(vec![], 0, 0);
        assert!(!frame.is_well_formed());
    }
}
