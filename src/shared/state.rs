//! Scan session state owned by the UI path

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::geometry::EffectiveFrameSize;
use crate::shared::gate::ScanGate;
use crate::shared::messages::{CapturedScan, PipelineEvent, UiCommand};
use crate::vision::{LineResult, Snapshot};

/// Where the session is in its capture/review cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanSession {
    /// Looking for an MRZ
    #[default]
    Scanning,
    /// Holding a captured result for the user
    Reviewing(CapturedScan),
}

impl ScanSession {
    pub fn is_reviewing(&self) -> bool {
        matches!(self, ScanSession::Reviewing(_))
    }

    pub fn captured(&self) -> Option<&CapturedScan> {
        match self {
            ScanSession::Reviewing(scan) => Some(scan),
            ScanSession::Scanning => None,
        }
    }
}

/// Join line texts with newlines and drop trailing whitespace
pub fn copy_text(lines: &[LineResult]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.text);
        text.push('\n');
    }
    text.trim_end().to_string()
}

/// Counters for the frame path, readable from the UI
#[derive(Debug, Clone, Default)]
pub struct RuntimeStats {
    /// Frames that got past the throttle and the gate and reached the recognizer
    pub frames_admitted: u64,
    /// Frames dropped because a result was under review
    pub frames_skipped: u64,
    /// Calls into the recognition engine
    pub engine_calls: u64,
    /// Engine calls that failed
    pub engine_failures: u64,
    /// Cycles discarded by the line-count rule
    pub rejected_cycles: u64,
    /// Results handed to the UI
    pub commits: u64,
    /// Accepted results dropped because the gate or pipeline closed meanwhile
    pub stale_discards: u64,
    /// Effective frame size used for the last admitted frame
    pub effective_frame_size: Option<EffectiveFrameSize>,
    /// Last engine error message, if any
    pub last_error: Option<String>,
}

impl RuntimeStats {
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}

/// UI-side owner of the session. Receives committed scans and turns
/// dismiss/rescan into a gate reset.
pub struct ReviewController {
    session: ScanSession,
    events: Receiver<PipelineEvent>,
    gate: ScanGate,
    pipeline_stopped: bool,
}

impl ReviewController {
    pub fn new(events: Receiver<PipelineEvent>, gate: ScanGate) -> Self {
        Self {
            session: ScanSession::Scanning,
            events,
            gate,
            pipeline_stopped: false,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn lines(&self) -> &[LineResult] {
        self.session
            .captured()
            .map(|scan| scan.lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.session.captured().and_then(|scan| scan.snapshot.as_ref())
    }

    pub fn is_pipeline_stopped(&self) -> bool {
        self.pipeline_stopped
    }

    /// Drain pending events without blocking. Returns true if a scan was received.
    pub fn poll(&mut self) -> bool {
        let mut received = false;
        while let Ok(event) = self.events.try_recv() {
            received |= self.apply(event);
        }
        received
    }

    /// Block until a scan is committed, the pipeline stops, or `timeout` elapses
    pub fn wait_for_commit(&mut self, timeout: Duration) -> Option<&CapturedScan> {
        let deadline = Instant::now() + timeout;
        while !self.session.is_reviewing() && !self.pipeline_stopped {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    self.apply(event);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    self.pipeline_stopped = true;
                }
            }
        }
        self.session.captured()
    }

    fn apply(&mut self, event: PipelineEvent) -> bool {
        match event {
            PipelineEvent::Committed(scan) => {
                if self.session.is_reviewing() {
                    warn!("Dropping scan {} received while already reviewing", scan.id);
                    return false;
                }
                info!("Reviewing scan {} ({} lines)", scan.id, scan.lines.len());
                self.session = ScanSession::Reviewing(scan);
                true
            }
            PipelineEvent::Stopped => {
                debug!("Frame pipeline reported stop");
                self.pipeline_stopped = true;
                false
            }
        }
    }

    /// Close the review and resume scanning
    pub fn dismiss(&mut self) {
        self.return_to_scanning("dismissed");
    }

    /// Discard the held result and scan again
    pub fn rescan(&mut self) {
        self.return_to_scanning("rescan");
    }

    /// Clipboard text for the held result
    pub fn copy_text(&self) -> Option<String> {
        self.session
            .captured()
            .map(|scan| copy_text(&scan.lines))
    }

    /// Dispatch a UI command. `Copy` yields the text to place on the clipboard.
    pub fn handle(&mut self, command: UiCommand) -> Option<String> {
        match command {
            UiCommand::Dismiss => {
                self.dismiss();
                None
            }
            UiCommand::Rescan => {
                self.rescan();
                None
            }
            UiCommand::Copy => self.copy_text(),
        }
    }

    fn return_to_scanning(&mut self, reason: &str) {
        // A commit may already be queued; it is the result being dismissed
        self.poll();

        // The gate reopens only for a result the UI holds. With nothing held,
        // a closed gate means a commit is still on its way.
        let ScanSession::Reviewing(scan) = std::mem::take(&mut self.session) else {
            debug!("Ignoring {} with no scan under review", reason);
            return;
        };
        info!("Scan {} {}", scan.id, reason);
        // Cleared before reopening so a fresh commit can never be wiped
        self.gate.reset();
    }
}
