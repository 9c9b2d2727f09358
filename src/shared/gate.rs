//! Single-admission scan gate
//!
//! The frame thread may only close the gate (`try_capture`); the UI thread may
//! only reopen it (`reset`). With one writer per transition a single atomic
//! flag is enough, no lock required.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared open/closed flag for one scan session
#[derive(Debug, Clone)]
pub struct ScanGate {
    open: Arc<AtomicBool>,
}

impl Default for ScanGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Close the gate. Returns true only for the caller that actually closed it.
    pub fn try_capture(&self) -> bool {
        self.open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Reopen the gate after the user dismissed or asked to rescan
    pub fn reset(&self) {
        if !self.open.swap(true, Ordering::AcqRel) {
            info!("Scan gate reopened");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_gate_starts_open() {
        let gate = ScanGate::new();
        assert!(gate.is_open());
    }

    #[test]
    fn test_try_capture_once_per_open_period() {
        let gate = ScanGate::new();
        assert!(gate.try_capture());
        assert!(!gate.is_open());
        assert!(!gate.try_capture());

        gate.reset();
        assert!(gate.is_open());
        assert!(gate.try_capture());
        assert!(!gate.try_capture());
    }

    #[test]
    fn test_reset_on_open_gate_is_harmless() {
        let gate = ScanGate::new();
        gate.reset();
        assert!(gate.is_open());
        assert!(gate.try_capture());
    }

    #[test]
    fn test_concurrent_capture_admits_exactly_one() {
        const THREADS: usize = 16;

        for _ in 0..50 {
            let gate = ScanGate::new();
            let barrier = Arc::new(Barrier::new(THREADS));
            let winners = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let gate = gate.clone();
                    let barrier = barrier.clone();
                    let winners = winners.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        if gate.try_capture() {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(winners.load(Ordering::SeqCst), 1);
            assert!(!gate.is_open());
        }
    }
}
