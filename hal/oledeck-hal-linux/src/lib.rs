//! Linux HAL for oledeck
//!
//! Implements the [`oledeck_hal`] traits on top of `linux-embedded-hal`:
//!
//! - GPIO lines through the character device (`/dev/gpiochipN`)
//! - I2C through `/dev/i2c-N`
//! - SPI through `/dev/spidevB.C` (handed to drivers as an
//!   `embedded_hal::spi::SpiDevice`)

#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod i2c;
pub mod spi;

pub use error::HalError;
pub use gpio::{GpioChip, LinuxInput, LinuxOutput};
pub use i2c::LinuxI2c;
pub use spi::open_spi;
