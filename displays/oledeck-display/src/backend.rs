//! Panel driver trait
//!
//! Pixels go through `embedded-graphics`; everything else a panel does is
//! covered here.

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::*;

/// Highest contrast level accepted by [`PixelDriver::set_contrast`]
pub const CONTRAST_MAX: u8 = 254;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Control line (DC/RST) could not be driven
    Pin,
    /// Display not initialized
    NotInitialized,
}

/// A grayscale panel with an off-screen buffer
///
/// Drawing goes to the buffer; nothing reaches the glass until
/// [`present`](PixelDriver::present).
pub trait PixelDriver: DrawTarget<Color = Gray4> {
    /// Push the buffer to the panel
    ///
    /// `full = true` repaints every row. `full = false` may send only the
    /// rows that changed since the previous present.
    fn present(&mut self, full: bool) -> Result<(), DisplayError>;

    /// Switch the panel on or off. The buffer is kept while off.
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Set contrast, clamped to [`CONTRAST_MAX`]
    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError>;
}
