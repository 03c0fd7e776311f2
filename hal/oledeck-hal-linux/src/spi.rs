//! SPI device setup

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use log::info;

use crate::HalError;

/// Open and configure an SPI device for the panel (mode 0, 8-bit words)
pub fn open_spi(path: &str, max_speed_hz: u32) -> Result<SpidevDevice, HalError> {
    let mut spi = SpidevDevice::open(path).map_err(|source| HalError::SpiOpen {
        path: path.into(),
        source,
    })?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(max_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).map_err(|source| HalError::Spi {
        path: path.into(),
        source,
    })?;
    info!("SPI {} configured at {} Hz", path, max_speed_hz);
    Ok(spi)
}
