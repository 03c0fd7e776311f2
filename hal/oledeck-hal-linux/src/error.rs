//! HAL error type

use linux_embedded_hal::gpio_cdev::errors::Error as GpioError;
use linux_embedded_hal::{CdevPinError, I2CError, SPIError};
use thiserror::Error;

/// Errors raised while opening or driving Linux peripherals
#[derive(Debug, Error)]
pub enum HalError {
    #[error("gpio chip {path}: {source}")]
    Chip {
        path: String,
        #[source]
        source: GpioError,
    },

    #[error("gpio line {line}: {source}")]
    Line {
        line: u32,
        #[source]
        source: GpioError,
    },

    #[error("gpio pin: {0}")]
    Pin(#[from] CdevPinError),

    #[error("i2c: {0}")]
    I2c(#[from] I2CError),

    #[error("cannot open spi device {path}: {source}")]
    SpiOpen {
        path: String,
        #[source]
        source: SPIError,
    },

    #[error("spi device {path}: {source}")]
    Spi {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
