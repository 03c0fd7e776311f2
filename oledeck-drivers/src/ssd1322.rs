//! SSD1322 OLED display driver
//!
//! Driver for 256x64 4-bit grayscale panels on a 4-wire SPI bus (data/
//! command on a separate line). Drawing goes to an in-memory
//! [`Framebuffer`]; [`PixelDriver::present`] pushes it to display RAM,
//! either whole or only the rows that changed since the last present.

use core::convert::Infallible;
use core::ops::RangeInclusive;

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use log::{info, trace};
use oledeck_display::{
    DisplayError, Framebuffer, PixelDriver, CONTRAST_MAX, PANEL_HEIGHT, PANEL_WIDTH,
};
use oledeck_display::framebuffer::ROW_BYTES;
use oledeck_hal::OutputPin;

/// SSD1322 commands
#[allow(dead_code)]
mod cmd {
    pub const ENABLE_GRAYSCALE: u8 = 0x00;
    pub const SET_COLUMN_ADDR: u8 = 0x15;
    pub const WRITE_RAM: u8 = 0x5C;
    pub const SET_ROW_ADDR: u8 = 0x75;
    pub const SET_REMAP: u8 = 0xA0;
    pub const SET_START_LINE: u8 = 0xA1;
    pub const SET_DISPLAY_OFFSET: u8 = 0xA2;
    pub const DISPLAY_NORMAL: u8 = 0xA6;
    pub const EXIT_PARTIAL: u8 = 0xA9;
    pub const FUNCTION_SELECT: u8 = 0xAB;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PHASE_LENGTH: u8 = 0xB1;
    pub const SET_CLOCK_DIV: u8 = 0xB3;
    pub const DISPLAY_ENHANCE_A: u8 = 0xB4;
    pub const SET_GPIO: u8 = 0xB5;
    pub const SET_SECOND_PRECHARGE: u8 = 0xB6;
    pub const DEFAULT_GRAY_TABLE: u8 = 0xB9;
    pub const SET_PRECHARGE_VOLTAGE: u8 = 0xBB;
    pub const SET_VCOMH: u8 = 0xBE;
    pub const SET_CONTRAST: u8 = 0xC1;
    pub const MASTER_CURRENT: u8 = 0xC7;
    pub const SET_MUX_RATIO: u8 = 0xCA;
    pub const DISPLAY_ENHANCE_B: u8 = 0xD1;
    pub const SET_COMMAND_LOCK: u8 = 0xFD;
}

/// Display RAM column of the panel's first pixel (4 pixels per column)
const COLUMN_OFFSET: u8 = 0x1C;
const COLUMNS: u8 = (PANEL_WIDTH / 4) as u8;

/// Largest single SPI write accepted by spidev's default buffer
const MAX_TRANSFER: usize = 4096;

pub struct Ssd1322<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    frame: Framebuffer,
    /// What display RAM currently holds
    shown: Framebuffer,
    initialized: bool,
}

impl<SPI, DC, RST> Ssd1322<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self {
            spi,
            dc,
            rst,
            frame: Framebuffer::new(),
            shown: Framebuffer::new(),
            initialized: false,
        }
    }

    /// Pulse the reset line
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(1);
        self.rst.set_low().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(|_| DisplayError::Pin)?;
        delay.delay_ms(10);
        Ok(())
    }

    /// Run the power-on sequence and clear display RAM
    pub fn init(&mut self, contrast: u8) -> Result<(), DisplayError> {
        let contrast = contrast.min(CONTRAST_MAX);
        let sequence: &[(u8, &[u8])] = &[
            (cmd::SET_COMMAND_LOCK, &[0x12]),
            (cmd::DISPLAY_OFF, &[]),
            (cmd::SET_CLOCK_DIV, &[0x91]),
            (cmd::SET_MUX_RATIO, &[0x3F]),
            (cmd::SET_DISPLAY_OFFSET, &[0x00]),
            (cmd::SET_START_LINE, &[0x00]),
            // horizontal increment, nibble remap, dual COM
            (cmd::SET_REMAP, &[0x14, 0x11]),
            (cmd::SET_GPIO, &[0x00]),
            (cmd::FUNCTION_SELECT, &[0x01]),
            (cmd::DISPLAY_ENHANCE_A, &[0xA0, 0xFD]),
            (cmd::SET_CONTRAST, &[contrast]),
            (cmd::MASTER_CURRENT, &[0x0F]),
            (cmd::DEFAULT_GRAY_TABLE, &[]),
            (cmd::SET_PHASE_LENGTH, &[0xE2]),
            (cmd::DISPLAY_ENHANCE_B, &[0x82, 0x20]),
            (cmd::SET_PRECHARGE_VOLTAGE, &[0x1F]),
            (cmd::SET_SECOND_PRECHARGE, &[0x08]),
            (cmd::SET_VCOMH, &[0x07]),
            (cmd::DISPLAY_NORMAL, &[]),
            (cmd::EXIT_PARTIAL, &[]),
        ];
        for (command, args) in sequence {
            self.command(*command, args)?;
        }

        self.initialized = true;
        self.frame = Framebuffer::new();
        self.write_rows(0..=(PANEL_HEIGHT as u16 - 1))?;
        self.command(cmd::DISPLAY_ON, &[])?;
        info!("SSD1322 initialized, contrast {}", contrast);
        Ok(())
    }

    /// The frame being drawn
    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    /// Replace the frame being drawn with one rendered elsewhere
    pub fn load(&mut self, frame: &Framebuffer) {
        self.frame.copy_from(frame);
    }

    fn command(&mut self, command: u8, args: &[u8]) -> Result<(), DisplayError> {
        send(&mut self.spi, &mut self.dc, false, &[command])?;
        if !args.is_empty() {
            send(&mut self.spi, &mut self.dc, true, args)?;
        }
        Ok(())
    }

    fn write_rows(&mut self, rows: RangeInclusive<u16>) -> Result<(), DisplayError> {
        let (first, last) = (*rows.start(), *rows.end());
        self.command(
            cmd::SET_COLUMN_ADDR,
            &[COLUMN_OFFSET, COLUMN_OFFSET + COLUMNS - 1],
        )?;
        self.command(cmd::SET_ROW_ADDR, &[first as u8, last as u8])?;
        self.command(cmd::WRITE_RAM, &[])?;

        let start = usize::from(first) * ROW_BYTES;
        let end = (usize::from(last) + 1) * ROW_BYTES;
        send(
            &mut self.spi,
            &mut self.dc,
            true,
            &self.frame.as_bytes()[start..end],
        )?;
        self.shown.copy_from(&self.frame);
        Ok(())
    }
}

fn send<SPI, DC>(spi: &mut SPI, dc: &mut DC, data: bool, bytes: &[u8]) -> Result<(), DisplayError>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    dc.set_state(data).map_err(|_| DisplayError::Pin)?;
    for chunk in bytes.chunks(MAX_TRANSFER) {
        spi.write(chunk).map_err(|_| DisplayError::Communication)?;
    }
    Ok(())
}

impl<SPI, DC, RST> OriginDimensions for Ssd1322<SPI, DC, RST> {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH, PANEL_HEIGHT)
    }
}

impl<SPI, DC, RST> DrawTarget for Ssd1322<SPI, DC, RST> {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.frame.clear(color)
    }
}

impl<SPI, DC, RST> PixelDriver for Ssd1322<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn present(&mut self, full: bool) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        let rows = if full {
            Some(0..=(PANEL_HEIGHT as u16 - 1))
        } else {
            self.frame.changed_rows(&self.shown)
        };
        match rows {
            Some(rows) => {
                trace!("present rows {}..={}", rows.start(), rows.end());
                self.write_rows(rows)
            }
            None => Ok(()),
        }
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        let command = if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF };
        self.command(command, &[])
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.command(cmd::SET_CONTRAST, &[level.min(CONTRAST_MAX)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use embedded_graphics::pixelcolor::GrayColor;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use embedded_hal::spi::{ErrorType, Operation};
    use std::rc::Rc;

    /// Bytes seen on the bus, tagged with the DC level at the time
    #[derive(Default)]
    struct Wire {
        dc: Cell<bool>,
        bytes: RefCell<Vec<(bool, u8)>>,
        transfers: Cell<usize>,
    }

    impl Wire {
        fn commands(&self) -> Vec<u8> {
            self.bytes
                .borrow()
                .iter()
                .filter(|(data, _)| !data)
                .map(|(_, b)| *b)
                .collect()
        }

        fn data_len(&self) -> usize {
            self.bytes.borrow().iter().filter(|(data, _)| *data).count()
        }

        fn reset(&self) {
            self.bytes.borrow_mut().clear();
            self.transfers.set(0);
        }
    }

    struct FakeSpi(Rc<Wire>);

    impl ErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    self.0.transfers.set(self.0.transfers.get() + 1);
                    let dc = self.0.dc.get();
                    self.0.bytes.borrow_mut().extend(bytes.iter().map(|b| (dc, *b)));
                }
            }
            Ok(())
        }
    }

    struct FakePin(Rc<Wire>);

    impl OutputPin for FakePin {
        type Error = ();

        fn set_high(&mut self) -> Result<(), ()> {
            self.0.dc.set(true);
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), ()> {
            self.0.dc.set(false);
            Ok(())
        }
    }

    struct NoReset;

    impl OutputPin for NoReset {
        type Error = ();

        fn set_high(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    fn panel() -> (Ssd1322<FakeSpi, FakePin, NoReset>, Rc<Wire>) {
        let wire = Rc::new(Wire::default());
        let driver = Ssd1322::new(FakeSpi(wire.clone()), FakePin(wire.clone()), NoReset);
        (driver, wire)
    }

    #[test]
    fn test_present_before_init() {
        let (mut driver, _) = panel();
        assert_eq!(driver.present(true), Err(DisplayError::NotInitialized));
    }

    #[test]
    fn test_init_clears_ram_and_turns_on() {
        let (mut driver, wire) = panel();
        driver.init(200).unwrap();
        let commands = wire.commands();
        assert_eq!(commands.first(), Some(&cmd::SET_COMMAND_LOCK));
        assert_eq!(commands.last(), Some(&cmd::DISPLAY_ON));
        assert!(commands.contains(&cmd::WRITE_RAM));
        // full frame split at the spidev limit
        assert!(wire.data_len() >= oledeck_display::framebuffer::FRAME_BYTES);
    }

    #[test]
    fn test_partial_present_sends_changed_rows() {
        let (mut driver, wire) = panel();
        driver.init(CONTRAST_MAX).unwrap();
        wire.reset();

        Rectangle::new(Point::new(0, 10), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(Gray4::WHITE))
            .draw(&mut driver)
            .unwrap();
        driver.present(false).unwrap();

        let bytes = wire.bytes.borrow();
        // row address command carries the changed range
        let row_cmd = bytes
            .iter()
            .position(|&(data, b)| !data && b == cmd::SET_ROW_ADDR)
            .unwrap();
        assert_eq!(bytes[row_cmd + 1], (true, 10));
        assert_eq!(bytes[row_cmd + 2], (true, 11));
        drop(bytes);
        assert_eq!(wire.data_len(), 2 + 2 + 2 * ROW_BYTES);
    }

    #[test]
    fn test_loaded_frame_presents_like_drawn_one() {
        let (mut driver, wire) = panel();
        driver.init(CONTRAST_MAX).unwrap();
        wire.reset();

        let mut frame = Framebuffer::new();
        Rectangle::new(Point::new(8, 40), Size::new(2, 1))
            .into_styled(PrimitiveStyle::with_fill(Gray4::WHITE))
            .draw(&mut frame)
            .unwrap();
        driver.load(&frame);
        assert!(driver.frame() == &frame);

        driver.present(false).unwrap();
        assert_eq!(wire.data_len(), 2 + 2 + ROW_BYTES);
    }

    #[test]
    fn test_unchanged_frame_sends_nothing() {
        let (mut driver, wire) = panel();
        driver.init(CONTRAST_MAX).unwrap();
        wire.reset();
        driver.present(false).unwrap();
        assert_eq!(wire.transfers.get(), 0);
    }

    #[test]
    fn test_contrast_clamped() {
        let (mut driver, wire) = panel();
        driver.init(CONTRAST_MAX).unwrap();
        wire.reset();
        driver.set_contrast(255).unwrap();
        assert_eq!(
            *wire.bytes.borrow(),
            vec![(false, cmd::SET_CONTRAST), (true, CONTRAST_MAX)]
        );
    }

    #[test]
    fn test_power() {
        let (mut driver, wire) = panel();
        driver.init(CONTRAST_MAX).unwrap();
        wire.reset();
        driver.set_power(false).unwrap();
        driver.set_power(true).unwrap();
        assert_eq!(wire.commands(), vec![cmd::DISPLAY_OFF, cmd::DISPLAY_ON]);
    }
}
