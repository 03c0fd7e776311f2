//! I2C bus abstractions
//!
//! Provides the raw bus trait plus a register-level extension used by the
//! I/O expander driver.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Byte-wide register access
///
/// Blanket-implemented for every [`I2cBus`].
pub trait RegisterBus: I2cBus {
    /// Write one byte to `register` on the device at `address`
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }

    /// Read one byte from `register` on the device at `address`
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.write_read(address, &[register], &mut buf)?;
        Ok(buf[0])
    }
}

impl<T: I2cBus + ?Sized> RegisterBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-device register file
    struct MockBus {
        registers: [u8; 32],
        writes: usize,
    }

    impl I2cBus for MockBus {
        type Error = ();

        fn write(&mut self, _address: u8, data: &[u8]) -> Result<(), ()> {
            self.writes += 1;
            if let [reg, value] = data {
                self.registers[*reg as usize] = *value;
            }
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), ()> {
            Err(())
        }

        fn write_read(&mut self, _address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
            read[0] = self.registers[write[0] as usize];
            Ok(())
        }
    }

    #[test]
    fn test_register_round_trip() {
        let mut bus = MockBus {
            registers: [0; 32],
            writes: 0,
        };
        bus.write_register(0x20, 0x12, 0x5A).unwrap();
        assert_eq!(bus.writes, 1);
        assert_eq!(bus.read_register(0x20, 0x12), Ok(0x5A));
        assert_eq!(bus.read_register(0x20, 0x13), Ok(0));
    }
}
