//! Display mode state machine
//!
//! Exactly one mode is active at any time and only that mode's renderer is
//! scheduled. Transitions come from four places: the player's transport
//! status, the reducer's exit-sleep signal, the single pending idle timer,
//! and the playlist browser being entered or left.
//!
//! ```text
//! Playback ──grace──► Clock ──to_screensaver──► Screensaver ──to_deep_sleep──► DeepSleep
//!    ▲                  ▲                           │                             │
//!    │                  └──────── exit_sleep ───────┴─────────────────────────────┘
//!    └──── status=play, from any mode
//!
//! PlaylistBrowse: entered by an encoder press while idle, left by a
//! selection or by playback starting
//! ```

pub mod controller;
pub mod mode;
pub mod timer;

pub use controller::{Effect, ModeController};
pub use mode::{Mode, ModeState};
pub use timer::{FrameSchedule, PendingTimer, TimerKind};
