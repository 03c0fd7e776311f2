//! Pending idle timer and renderer schedule

use crate::state::mode::Mode;

/// The one idle or grace timer that may be pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerKind {
    /// Playback left `play`; fall back to the clock when it expires
    Grace,
    ToClock,
    ToScreensaver,
    ToDeepSleep,
}

impl TimerKind {
    /// Part of the Clock → Screensaver → DeepSleep ladder
    pub fn is_ladder(self) -> bool {
        !matches!(self, TimerKind::Grace)
    }

    /// Whether the timer may stay armed while `mode` is shown
    pub fn valid_in(self, mode: Mode) -> bool {
        match self {
            TimerKind::Grace => mode == Mode::Playback,
            TimerKind::ToClock | TimerKind::ToScreensaver => mode == Mode::Clock,
            TimerKind::ToDeepSleep => mode == Mode::Screensaver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingTimer {
    pub kind: TimerKind,
    pub deadline_ms: u64,
}

impl PendingTimer {
    pub fn new(kind: TimerKind, now_ms: u64, delay_ms: u64) -> Self {
        Self {
            kind,
            deadline_ms: now_ms + delay_ms,
        }
    }

    pub fn due(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }
}

/// Fixed-period renderer schedule, tagged with the mode it draws
///
/// The first frame is due immediately. A late poll yields one frame and
/// reschedules from the current time; missed frames are never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSchedule {
    mode: Mode,
    period_ms: u64,
    next_due_ms: u64,
}

impl FrameSchedule {
    pub fn new(mode: Mode, period_ms: u64, now_ms: u64) -> Self {
        Self {
            mode,
            period_ms: period_ms.max(1),
            next_due_ms: now_ms,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    /// True when a frame is due at `now_ms`
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms += self.period_ms;
        if self.next_due_ms <= now_ms {
            self.next_due_ms = now_ms + self.period_ms;
        }
        true
    }
}
