//! I2C bus over `/dev/i2c-N`

use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use oledeck_hal::I2cBus;

use crate::HalError;

/// Linux I2C bus adapter
pub struct LinuxI2c(I2cdev);

impl LinuxI2c {
    /// Open a bus such as `/dev/i2c-1`
    pub fn open(path: &str) -> Result<Self, HalError> {
        let dev = I2cdev::new(path).map_err(|e| HalError::I2c(e.into()))?;
        Ok(Self(dev))
    }
}

impl I2cBus for LinuxI2c {
    type Error = HalError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), HalError> {
        Ok(I2c::write(&mut self.0, address, data)?)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), HalError> {
        Ok(I2c::read(&mut self.0, address, buf)?)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), HalError> {
        Ok(I2c::write_read(&mut self.0, address, write_data, read_buf)?)
    }
}
