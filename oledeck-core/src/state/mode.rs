//! Modes and their per-mode state

use oledeck_display::{PlaybackView, Snake};

use crate::browser::PlaylistBrowser;
use crate::config::FrameCadence;

/// Display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Clock,
    Playback,
    Screensaver,
    /// Panel powered off, no renderer
    DeepSleep,
    PlaylistBrowse,
}

/// The active mode together with the state only that mode uses
///
/// Replacing the variant drops the previous mode's animation state, so a
/// mode is always entered fresh.
pub enum ModeState {
    Clock,
    Playback(PlaybackView),
    Screensaver(Snake),
    DeepSleep,
    PlaylistBrowse(PlaylistBrowser),
}

impl ModeState {
    pub fn mode(&self) -> Mode {
        match self {
            ModeState::Clock => Mode::Clock,
            ModeState::Playback(_) => Mode::Playback,
            ModeState::Screensaver(_) => Mode::Screensaver,
            ModeState::DeepSleep => Mode::DeepSleep,
            ModeState::PlaylistBrowse(_) => Mode::PlaylistBrowse,
        }
    }

    /// Renderer period, `None` when nothing is drawn
    pub fn frame_period(&self, cadence: &FrameCadence) -> Option<u64> {
        match self {
            ModeState::Clock => Some(cadence.clock_ms),
            ModeState::Playback(_) => Some(cadence.playback_ms),
            ModeState::Screensaver(_) => Some(cadence.screensaver_ms),
            ModeState::DeepSleep => None,
            ModeState::PlaylistBrowse(_) => Some(cadence.browse_ms),
        }
    }

    /// Step animations by one frame
    pub fn advance(&mut self) {
        match self {
            ModeState::Playback(view) => view.advance(),
            ModeState::Screensaver(snake) => snake.advance(),
            _ => {}
        }
    }

    /// Frames of this mode repaint the whole panel
    ///
    /// Playback frames only push the rows that changed.
    pub fn full_present(&self) -> bool {
        !matches!(self, ModeState::Playback(_))
    }
}

impl core::fmt::Debug for ModeState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.mode())
    }
}
