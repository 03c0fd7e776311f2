//! Rendering for the oledeck front panel
//!
//! This crate provides:
//! - [`PixelDriver`], the panel-facing surface (an `embedded-graphics`
//!   draw target plus present/power/contrast)
//! - [`Framebuffer`], the 256x64 4-bit grayscale off-screen buffer
//! - [`FrameGate`], the busy flag that drops frames while a present is
//!   still running
//! - One renderer per display mode: [`clock`], [`playback`],
//!   [`screensaver`] and [`playlist`]
//!
//! # Architecture
//!
//! Renderers never own the panel. Each frame is split in two: a mutating
//! step that advances animation state (marquee offsets, the snake) and a
//! read-only `draw` into any `DrawTarget<Color = Gray4>`. The daemon draws
//! into a [`Framebuffer`] and hands it to the panel driver only when the
//! [`FrameGate`] is free.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backend;
pub mod clock;
pub mod framebuffer;
pub mod gate;
pub mod glyphs;
pub mod playback;
pub mod playlist;
pub mod scaled;
pub mod screensaver;
pub mod text;

pub use backend::{DisplayError, PixelDriver, CONTRAST_MAX};
pub use clock::{ClockFace, ClockTime};
pub use framebuffer::{Framebuffer, PANEL_HEIGHT, PANEL_WIDTH};
pub use gate::FrameGate;
pub use playback::{Marquee, PlaybackView, SeekBar};
pub use playlist::PlaylistPage;
pub use screensaver::Snake;
