//! oledeck core logic
//!
//! This crate contains all board-agnostic logic for the front panel:
//! - Input debouncing (button matrix, rotary encoder, push switch)
//! - Command dispatch and the concurrency-1 execution queue
//! - Player state reduction (snapshot diffing, seek formatting)
//! - The display mode state machine with its idle ladder and grace timer
//! - The playlist browser
//! - [`app::App`], which wires the pieces together behind a typed
//!   inbox/outbox so the daemon only moves messages and pixels
//!
//! Time is always passed in as milliseconds since an arbitrary epoch; this
//! crate never reads a clock.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod browser;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod player;
pub mod render;
pub mod state;

pub use app::{App, Job, Outbound};
pub use config::CoreConfig;
pub use state::{Mode, ModeController};
pub use render::{draw_frame, Present};
