//! GPIO line abstractions
//!
//! Lines on a Linux host are reached through a character device, so every
//! access can fail. Reads report the raw electrical level; callers apply
//! the active-low convention themselves.

/// Digital output line
pub trait OutputPin {
    /// Error type for line operations
    type Error;

    /// Drive the line high (logic 1)
    fn set_high(&mut self) -> Result<(), Self::Error>;

    /// Drive the line low (logic 0)
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Drive the line to a specific level
    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

/// Digital input line
pub trait InputPin {
    /// Error type for line operations
    type Error;

    /// Check if the line reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Check if the line reads low (logic 0)
    ///
    /// With the panel's pull-ups this means "pressed" or "engaged".
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
