//! Drop-if-busy frame gate
//!
//! A renderer claims the gate before drawing and the panel side releases
//! it once the present has finished. A tick that finds the gate held is
//! dropped, not queued, so a slow panel costs frames rather than latency.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub struct FrameGate {
    busy: AtomicBool,
    dropped: AtomicU32,
}

impl FrameGate {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
        }
    }

    /// Claim the panel for one frame
    ///
    /// Returns `false` (and counts a dropped frame) while the previous
    /// present is still running.
    pub fn try_begin(&self) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Release the panel after a present (or a failed one)
    pub fn finish(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Frames dropped since startup
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new()
    }
}
