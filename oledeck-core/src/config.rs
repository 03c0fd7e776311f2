//! Tunable timings
//!
//! All durations are milliseconds. Defaults match the panel's shipped
//! behavior; the daemon overrides them from its config file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dispatch::ButtonMap;

/// Idle ladder and grace period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Timings {
    /// Idle time before the clock is shown
    pub to_clock_ms: u64,
    /// Time on the clock before the screensaver starts
    pub to_screensaver_ms: u64,
    /// Time in the screensaver before the panel is switched off
    pub to_deep_sleep_ms: u64,
    /// Delay between leaving `play` and falling back to the clock
    pub grace_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            to_clock_ms: 6_000,
            to_screensaver_ms: 60_000,
            to_deep_sleep_ms: 120_000,
            grace_ms: 60_000,
        }
    }
}

/// Frame period of each animated mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FrameCadence {
    pub clock_ms: u64,
    pub playback_ms: u64,
    pub screensaver_ms: u64,
    pub browse_ms: u64,
}

impl Default for FrameCadence {
    fn default() -> Self {
        Self {
            clock_ms: 1_000,
            playback_ms: 40,
            screensaver_ms: 40,
            browse_ms: 40,
        }
    }
}

/// Player state polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PollConfig {
    pub state_poll_ms: u64,
    /// HTTP timeout; a request that runs out is answered as a failure
    pub request_timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            state_poll_ms: 1_000,
            request_timeout_ms: 5_000,
        }
    }
}

/// Playlist listing retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BrowseConfig {
    pub attempts: u8,
    pub timeout_ms: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout_ms: 5_000,
        }
    }
}

/// Everything [`crate::App`] needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub timings: Timings,
    pub cadence: FrameCadence,
    pub poll: PollConfig,
    pub browse: BrowseConfig,
    pub buttons: ButtonMap,
}
