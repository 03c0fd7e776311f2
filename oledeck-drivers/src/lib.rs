//! Front panel hardware drivers
//!
//! Concrete drivers for the two chips on the panel board, written against
//! the `oledeck-hal` traits and `embedded-hal` so the daemon can hand them
//! Linux devices and tests can hand them mocks:
//!
//! - [`mcp23017`] - I2C expander carrying the 2×4 button matrix and the LEDs
//! - [`ssd1322`] - 256×64 4-bit grayscale OLED controller on SPI

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod mcp23017;
pub mod ssd1322;

pub use mcp23017::{set_leds, ExpanderError, Mcp23017};
pub use ssd1322::Ssd1322;
