//! GPIO lines over the Linux character device

use embedded_hal::digital::{InputPin as _, OutputPin as _};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;
use log::debug;

use crate::HalError;

/// An opened GPIO chip that hands out requested lines
pub struct GpioChip {
    chip: Chip,
}

impl GpioChip {
    /// Open a chip such as `/dev/gpiochip0`
    pub fn open(path: &str) -> Result<Self, HalError> {
        let chip = Chip::new(path).map_err(|source| HalError::Chip {
            path: path.into(),
            source,
        })?;
        Ok(Self { chip })
    }

    /// Request `line` as an input
    pub fn input(&mut self, line: u32, consumer: &str) -> Result<LinuxInput, HalError> {
        let handle = self
            .chip
            .get_line(line)
            .and_then(|l| l.request(LineRequestFlags::INPUT, 0, consumer))
            .map_err(|source| HalError::Line { line, source })?;
        let pin = CdevPin::new(handle).map_err(|source| HalError::Line { line, source })?;
        debug!("gpio {} requested as input ({})", line, consumer);
        Ok(LinuxInput(pin))
    }

    /// Request `line` as an output driven to `initial`
    pub fn output(
        &mut self,
        line: u32,
        initial: bool,
        consumer: &str,
    ) -> Result<LinuxOutput, HalError> {
        let handle = self
            .chip
            .get_line(line)
            .and_then(|l| l.request(LineRequestFlags::OUTPUT, u8::from(initial), consumer))
            .map_err(|source| HalError::Line { line, source })?;
        let pin = CdevPin::new(handle).map_err(|source| HalError::Line { line, source })?;
        debug!("gpio {} requested as output ({})", line, consumer);
        Ok(LinuxOutput(pin))
    }
}

/// Input line (rotary CLK/DT, encoder switch)
pub struct LinuxInput(CdevPin);

impl oledeck_hal::InputPin for LinuxInput {
    type Error = HalError;

    fn is_high(&mut self) -> Result<bool, HalError> {
        Ok(self.0.is_high()?)
    }
}

/// Output line (panel DC/RST)
pub struct LinuxOutput(CdevPin);

impl oledeck_hal::OutputPin for LinuxOutput {
    type Error = HalError;

    fn set_high(&mut self) -> Result<(), HalError> {
        Ok(self.0.set_high()?)
    }

    fn set_low(&mut self) -> Result<(), HalError> {
        Ok(self.0.set_low()?)
    }
}
