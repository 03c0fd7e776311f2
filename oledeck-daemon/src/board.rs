//! Panel board bring-up
//!
//! Opens the Linux devices named in the configuration and brings each chip
//! to a known state. Any failure here stops the daemon.

use linux_embedded_hal::{Delay, SpidevDevice};
use log::info;
use oledeck_drivers::{Mcp23017, Ssd1322};
use oledeck_hal_linux::{open_spi, GpioChip, LinuxI2c, LinuxOutput};

use crate::config::{DisplaySection, InputSection};
use crate::error::DaemonError;
use crate::tasks::EncoderLines;

pub type PanelDevice = Ssd1322<SpidevDevice, LinuxOutput, LinuxOutput>;

/// Reset and initialize the SSD1322; contrast is applied here
pub fn open_panel(chip: &mut GpioChip, display: &DisplaySection) -> Result<PanelDevice, DaemonError> {
    let spi = open_spi(&display.spi_device, display.spi_hz)?;
    let dc = chip.output(display.dc_line, false, "oledeck-dc")?;
    let rst = chip.output(display.reset_line, true, "oledeck-rst")?;

    let mut panel = Ssd1322::new(spi, dc, rst);
    panel.reset(&mut Delay)?;
    panel.init(display.contrast)?;
    Ok(panel)
}

/// Configure the expander ports and switch the LEDs off
pub fn open_expander(input: &InputSection) -> Result<Mcp23017<LinuxI2c>, DaemonError> {
    let bus = LinuxI2c::open(&input.i2c_device)?;
    let mut expander = Mcp23017::new(bus, input.expander_address);
    expander.init()?;
    info!(
        "expander ready at {:#04x} on {}",
        input.expander_address, input.i2c_device
    );
    Ok(expander)
}

pub fn open_encoder(chip: &mut GpioChip, input: &InputSection) -> Result<EncoderLines, DaemonError> {
    Ok(EncoderLines {
        clk: chip.input(input.clk_line, "oledeck-clk")?,
        dt: chip.input(input.dt_line, "oledeck-dt")?,
        sw: chip.input(input.sw_line, "oledeck-sw")?,
    })
}
