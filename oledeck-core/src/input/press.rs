//! Encoder push switch
//!
//! Active-low line sampled by a polling task. A press is the falling edge;
//! any further falling edge within the guard window of an accepted press
//! is contact chatter and is ignored.

/// Shortest guard accepted
pub const MIN_GUARD_MS: u64 = 50;

pub struct PressSwitch {
    last_high: bool,
    last_press_ms: Option<u64>,
    guard_ms: u64,
}

impl PressSwitch {
    /// `guard_ms` below [`MIN_GUARD_MS`] is raised to it
    pub fn new(initial_high: bool, guard_ms: u64) -> Self {
        Self {
            last_high: initial_high,
            last_press_ms: None,
            guard_ms: guard_ms.max(MIN_GUARD_MS),
        }
    }

    pub fn guard_ms(&self) -> u64 {
        self.guard_ms
    }

    /// Feed one sample; `true` on an accepted press
    pub fn sample(&mut self, high: bool, now_ms: u64) -> bool {
        let falling = self.last_high && !high;
        self.last_high = high;
        if !falling {
            return false;
        }
        if let Some(last) = self.last_press_ms {
            if now_ms.saturating_sub(last) < self.guard_ms {
                return false;
            }
        }
        self.last_press_ms = Some(now_ms);
        true
    }
}
