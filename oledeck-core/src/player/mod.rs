//! Player state tracking
//!
//! The reducer owns the only copy of the player's state on the panel side.
//! Snapshots arrive from the daemon's polling worker and are compared
//! field-group by field-group against the previous one; the resulting
//! [`PlayerEvent`]s and the exit-sleep flag drive the mode controller.

pub mod reducer;
pub mod seek;

pub use reducer::{Ingest, PlayerEvent, Reduction, StateReducer};
pub use seek::{format_seek, SeekDisplay};
