//! Application Coordinator
//!
//! Wires the frame path and the UI path together: spawns the frame thread,
//! owns the hand-off channels, and tears the pipeline down on drop.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, unbounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info};

use crate::capture::{select_format, CameraFormat, CameraPermission, CapturedFrame, FrameThrottle};
use crate::config::AppConfig;
use crate::geometry::{FrameGeometryResolver, FrameSize, WindowOrientation};
use crate::pipeline::FrameProcessor;
use crate::shared::{ReviewController, RuntimeStats, ScanGate};
use crate::vision::{RecognitionEngine, RecognitionInvoker};

/// Frames queued between the camera and the frame thread. The camera drops
/// frames rather than waiting when the queue is full.
pub const FRAME_QUEUE_DEPTH: usize = 4;

/// Main application coordinator
pub struct MrzScannerApp {
    /// Session gate shared by both paths
    gate: ScanGate,
    /// Cleared on teardown; the frame thread stops admitting frames
    active: Arc<AtomicBool>,
    /// Frame path counters
    stats: Arc<RwLock<RuntimeStats>>,
    /// Current window orientation, read by the frame thread
    window: Arc<RwLock<WindowOrientation>>,
    /// Camera side of the frame queue; `None` when the camera is unavailable
    frames: Option<Sender<CapturedFrame>>,
    /// UI side of the session
    review: ReviewController,
    /// Format chosen from those the camera offered; `None` leaves the
    /// platform default in place
    camera_format: Option<CameraFormat>,
    /// Handle to the frame thread
    frame_handle: Option<JoinHandle<()>>,
}

impl MrzScannerApp {
    /// Start a scanning session on a camera offering `formats`. With
    /// permission denied the coordinator is still built but the frame path
    /// never activates.
    pub fn start(
        config: &AppConfig,
        engine: Arc<dyn RecognitionEngine>,
        permission: CameraPermission,
        formats: &[CameraFormat],
        window: WindowOrientation,
    ) -> Result<Self> {
        let gate = ScanGate::new();
        let stats = Arc::new(RwLock::new(RuntimeStats::default()));
        let window = Arc::new(RwLock::new(window));
        let (event_tx, event_rx) = unbounded();
        let review = ReviewController::new(event_rx, gate.clone());

        if !permission.is_granted() {
            info!("Camera permission denied, scanning not started");
            return Ok(Self {
                gate,
                active: Arc::new(AtomicBool::new(false)),
                stats,
                window,
                frames: None,
                review,
                camera_format: None,
                frame_handle: None,
            });
        }

        let capture = config.capture_config();
        let camera_format = select_format(formats, capture.preferred_resolution);

        let active = Arc::new(AtomicBool::new(true));
        let (frame_tx, frame_rx) = bounded(FRAME_QUEUE_DEPTH);

        let invoker = RecognitionInvoker::new(engine, config.recognition_config());
        let resolver = match camera_format {
            Some(format) => FrameGeometryResolver::with_initial_size(
                config.scan.platform,
                *window.read(),
                FrameSize::new(format.video_width, format.video_height),
            ),
            None => FrameGeometryResolver::new(config.scan.platform, *window.read()),
        };
        let processor = FrameProcessor::new(
            invoker,
            resolver,
            window.clone(),
            gate.clone(),
            active.clone(),
            event_tx,
            stats.clone(),
        );
        let throttle = FrameThrottle::new(capture.max_fps);

        let handle = std::thread::Builder::new()
            .name("mrz-frame-processor".to_string())
            .spawn(move || processor.run(frame_rx, throttle))
            .context("Failed to spawn frame processor thread")?;

        info!(
            "Scanning started on {:?} at {} fps",
            config.scan.platform, capture.max_fps
        );

        Ok(Self {
            gate,
            active,
            stats,
            window,
            frames: Some(frame_tx),
            review,
            camera_format,
            frame_handle: Some(handle),
        })
    }

    /// Whether the frame path is accepting frames
    pub fn is_scanning(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.frames.is_some()
    }

    /// Offer a frame from the camera. Returns false if it was dropped.
    pub fn submit_frame(&self, frame: CapturedFrame) -> bool {
        let Some(frames) = &self.frames else {
            return false;
        };
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        match frames.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Frame queue full, dropping frame");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Camera format selected at start
    pub fn camera_format(&self) -> Option<CameraFormat> {
        self.camera_format
    }

    /// A sender for feeding frames from a camera callback thread
    pub fn frame_sender(&self) -> Option<Sender<CapturedFrame>> {
        self.frames.clone()
    }

    /// Report a window orientation change from the UI
    pub fn set_window_orientation(&self, orientation: WindowOrientation) {
        *self.window.write() = orientation;
    }

    pub fn review(&self) -> &ReviewController {
        &self.review
    }

    pub fn review_mut(&mut self) -> &mut ReviewController {
        &mut self.review
    }

    pub fn gate(&self) -> &ScanGate {
        &self.gate
    }

    /// Snapshot of the frame path counters
    pub fn stats(&self) -> RuntimeStats {
        self.stats.read().clone()
    }

    /// Stop admitting frames and wait for the frame thread. In-flight
    /// recognition finishes but its result is discarded.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        // Dropping the sender wakes the frame thread if it is waiting for frames
        self.frames = None;
        if let Some(handle) = self.frame_handle.take() {
            let _ = handle.join();
            info!("Scanning stopped");
        }
    }
}

impl Drop for MrzScannerApp {
    fn drop(&mut self) {
        self.stop();
    }
}
