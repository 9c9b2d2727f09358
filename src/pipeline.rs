//! Frame Processing Path
//!
//! Runs on its own thread. Each admitted frame goes through geometry
//! resolution, recognition and aggregation; an accepted result is committed
//! to the UI through the gate, at most once per open period.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::capture::{CapturedFrame, FrameThrottle};
use crate::geometry::{
    crop_offset, region_to_pixels, FrameGeometryResolver, ScanRegion, WindowOrientation,
};
use crate::shared::{CaptureGeometry, CapturedScan, PipelineEvent, RuntimeStats, ScanGate};
use crate::vision::{aggregate, Aggregation, EngineError, RecognitionInvoker, Snapshot};

/// How often an idle frame thread re-checks for teardown
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What happened to one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The pipeline was torn down
    Inactive,
    /// A result is under review; the recognizer was not called
    GateClosed,
    /// The engine failed; treated as no result
    EngineFailed(EngineError),
    /// Not exactly two lines
    Rejected { line_count: usize },
    /// Accepted, but the gate closed or the pipeline stopped while recognizing
    Stale,
    /// Handed to the UI
    Committed(Uuid),
}

/// Per-frame processing state owned by the frame thread
pub struct FrameProcessor {
    invoker: RecognitionInvoker,
    resolver: FrameGeometryResolver,
    region: ScanRegion,
    window: Arc<RwLock<WindowOrientation>>,
    gate: ScanGate,
    active: Arc<AtomicBool>,
    events: Sender<PipelineEvent>,
    stats: Arc<RwLock<RuntimeStats>>,
}

impl FrameProcessor {
    pub fn new(
        invoker: RecognitionInvoker,
        resolver: FrameGeometryResolver,
        window: Arc<RwLock<WindowOrientation>>,
        gate: ScanGate,
        active: Arc<AtomicBool>,
        events: Sender<PipelineEvent>,
        stats: Arc<RwLock<RuntimeStats>>,
    ) -> Self {
        let region = invoker.config().scan_region;
        Self {
            invoker,
            resolver,
            region,
            window,
            gate,
            active,
            events,
            stats,
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Process one admitted frame
    pub fn process(&mut self, frame: &CapturedFrame) -> FrameOutcome {
        if !self.is_active() {
            return FrameOutcome::Inactive;
        }

        // First check: skip the slow recognizer while a result is under review
        if !self.gate.is_open() {
            self.stats.write().frames_skipped += 1;
            return FrameOutcome::GateClosed;
        }

        let window = *self.window.read();
        self.resolver.set_window_orientation(window);
        let effective = self.resolver.resolve(frame.width, frame.height);
        {
            let mut stats = self.stats.write();
            stats.frames_admitted += 1;
            stats.engine_calls += 1;
            stats.effective_frame_size = Some(effective);
        }

        let raw = match self.invoker.invoke(frame) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("Engine failure, waiting for next frame: {}", err);
                let mut stats = self.stats.write();
                stats.engine_failures += 1;
                stats.set_error(err.to_string());
                return FrameOutcome::EngineFailed(err);
            }
        };
        self.stats.write().clear_error();

        let image = raw.image_base64.clone();
        let lines = match aggregate(raw) {
            Aggregation::Accepted(lines) => lines,
            Aggregation::Rejected { line_count } => {
                self.stats.write().rejected_cycles += 1;
                return FrameOutcome::Rejected { line_count };
            }
        };

        // Second check, fused with the close: recognition took time and the
        // session may have been captured meanwhile
        if !self.gate.try_capture() {
            debug!("Discarding stale result");
            self.stats.write().stale_discards += 1;
            return FrameOutcome::Stale;
        }
        // Teardown is checked while holding the gate, so a stop that lands
        // before this point never sees a commit
        if !self.is_active() {
            debug!("Discarding result after teardown");
            self.gate.reset();
            self.stats.write().stale_discards += 1;
            return FrameOutcome::Stale;
        }

        let scan = CapturedScan {
            id: Uuid::new_v4(),
            lines,
            snapshot: image
                .filter(|payload| !payload.is_empty())
                .map(Snapshot::from_base64),
            geometry: CaptureGeometry {
                frame: effective,
                region: region_to_pixels(effective, &self.region),
                crop_offset: crop_offset(effective, &self.region),
            },
        };
        let id = scan.id;
        info!("Committing scan {}", id);
        self.stats.write().commits += 1;

        if self.events.send(PipelineEvent::Committed(scan)).is_err() {
            debug!("UI receiver gone, scan {} dropped", id);
        }
        FrameOutcome::Committed(id)
    }

    /// Frame loop: throttle, then process, until the pipeline is torn down or
    /// the camera side disconnects
    pub fn run(mut self, frames: Receiver<CapturedFrame>, mut throttle: FrameThrottle) {
        info!(
            "Frame processor started ({:?} between recognitions)",
            throttle.min_interval()
        );

        loop {
            let frame = match frames.recv_timeout(IDLE_POLL_INTERVAL) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) if self.is_active() => continue,
                Err(_) => break,
            };
            if !self.is_active() {
                break;
            }
            if !throttle.admit(frame.timestamp) {
                continue;
            }
            self.process(&frame);
        }

        let _ = self.events.send(PipelineEvent::Stopped);
        info!("Frame processor stopped");
    }
}
