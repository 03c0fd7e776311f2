//! MCP23017 I/O expander
//!
//! The panel board wires the expander as follows:
//!
//! | Port | Bits | Direction | Use                                  |
//! |------|------|-----------|--------------------------------------|
//! | A    | 0-7  | output    | LED next to button `bit + 1`         |
//! | B    | 0-1  | output    | Matrix columns, active low           |
//! | B    | 2-5  | input     | Matrix rows, pulled up, active low   |
//!
//! Register addresses assume the power-on `IOCON.BANK = 0` layout.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use log::{debug, warn};
use oledeck_core::input::matrix::{column_drive, COLUMNS, ROW_MASK};
use oledeck_core::input::MatrixScan;
use oledeck_hal::RegisterBus;

/// MCP23017 register addresses (BANK = 0)
pub mod reg {
    /// Port A direction (1 = input)
    pub const IODIRA: u8 = 0x00;
    /// Port B direction (1 = input)
    pub const IODIRB: u8 = 0x01;
    /// Port A pull-ups
    pub const GPPUA: u8 = 0x0C;
    /// Port B pull-ups
    pub const GPPUB: u8 = 0x0D;
    /// Port A pins
    pub const GPIOA: u8 = 0x12;
    /// Port B pins
    pub const GPIOB: u8 = 0x13;
}

/// Address with A0-A2 tied low
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Settling time before an LED write is read back
pub const LED_VERIFY_DELAY_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpanderError<E> {
    Bus(E),
    /// Port A still read back differently after the retry
    LedMismatch { wanted: u8, read: u8 },
}

pub struct Mcp23017<B> {
    bus: B,
    address: u8,
}

impl<B: RegisterBus> Mcp23017<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Configure ports and switch all LEDs off
    pub fn init(&mut self) -> Result<(), ExpanderError<B::Error>> {
        debug!("configuring expander at {:#04x}", self.address);
        let setup = [
            (reg::IODIRB, ROW_MASK),
            (reg::GPPUB, ROW_MASK),
            (reg::IODIRA, 0x00),
            (reg::GPIOA, 0x00),
        ];
        for (register, value) in setup {
            self.write(register, value)?;
        }
        Ok(())
    }

    /// Select each column in turn and read the rows back
    pub fn scan(&mut self) -> Result<MatrixScan, ExpanderError<B::Error>> {
        let mut reads = [0u8; COLUMNS];
        for (column, read) in reads.iter_mut().enumerate() {
            self.write(reg::GPIOB, column_drive(column))?;
            *read = self.read(reg::GPIOB)?;
        }
        Ok(MatrixScan::from_column_reads(reads))
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), ExpanderError<B::Error>> {
        self.bus
            .write_register(self.address, register, value)
            .map_err(ExpanderError::Bus)
    }

    fn read(&mut self, register: u8) -> Result<u8, ExpanderError<B::Error>> {
        self.bus
            .read_register(self.address, register)
            .map_err(ExpanderError::Bus)
    }
}

/// Write the LED port and verify it, retrying once
///
/// The expander is shared with the matrix scan, so it is locked only for
/// each bus transfer and left free while the port settles.
pub async fn set_leds<M, B, D>(
    expander: &Mutex<M, Mcp23017<B>>,
    mask: u8,
    delay: &mut D,
) -> Result<(), ExpanderError<B::Error>>
where
    M: RawMutex,
    B: RegisterBus,
    D: DelayNs,
{
    let mut read = 0;
    for attempt in 0..2 {
        expander.lock().await.write(reg::GPIOA, mask)?;
        delay.delay_ms(LED_VERIFY_DELAY_MS).await;
        read = expander.lock().await.read(reg::GPIOA)?;
        if read == mask {
            return Ok(());
        }
        if attempt == 0 {
            warn!("LED readback {:08b}, wanted {:08b}, retrying", read, mask);
        }
    }
    Err(ExpanderError::LedMismatch { wanted: mask, read })
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use oledeck_core::input::ButtonId;
    use oledeck_hal::I2cBus;

    /// Expander model: port B rows depend on which column is driven low
    struct FakeExpander {
        registers: [u8; 0x16],
        pressed: [[bool; COLUMNS]; 4],
        /// Bits of port A that refuse to latch for the next N writes
        stuck: Option<(u8, usize)>,
        writes: Vec<(u8, u8)>,
    }

    impl FakeExpander {
        fn new() -> Self {
            Self {
                registers: [0; 0x16],
                pressed: [[false; COLUMNS]; 4],
                stuck: None,
                writes: Vec::new(),
            }
        }
    }

    impl I2cBus for FakeExpander {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            assert_eq!(address, DEFAULT_ADDRESS);
            let &[register, value] = data else {
                return Err(());
            };
            let mut value = value;
            if register == reg::GPIOA {
                if let Some((bits, remaining)) = self.stuck.as_mut() {
                    if *remaining > 0 {
                        value &= !*bits;
                        *remaining -= 1;
                    }
                }
            }
            self.writes.push((register, value));
            self.registers[register as usize] = value;
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), ()> {
            Err(())
        }

        fn write_read(&mut self, _address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
            let register = write[0];
            read[0] = if register == reg::GPIOB {
                let drive = self.registers[reg::GPIOB as usize];
                let column = if drive & 0x01 == 0 { 0 } else { 1 };
                let mut value = ROW_MASK | drive;
                for (row, line) in self.pressed.iter().enumerate() {
                    if line[column] {
                        value &= !(1 << (row + 2));
                    }
                }
                value
            } else {
                self.registers[register as usize]
            };
            Ok(())
        }
    }

    #[derive(Default)]
    struct NoDelay {
        waited_ns: u64,
    }

    impl NoDelay {
        fn waited_ms(&self) -> u64 {
            self.waited_ns / 1_000_000
        }
    }

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waited_ns += u64::from(ns);
        }
    }

    #[test]
    fn test_init_sequence() {
        let mut expander = Mcp23017::new(FakeExpander::new(), DEFAULT_ADDRESS);
        expander.init().unwrap();
        assert_eq!(
            expander.release().writes,
            vec![
                (reg::IODIRB, 0x3C),
                (reg::GPPUB, 0x3C),
                (reg::IODIRA, 0x00),
                (reg::GPIOA, 0x00),
            ]
        );
    }

    #[test]
    fn test_scan_maps_layout() {
        let mut fake = FakeExpander::new();
        // row 0 column 1 is button 1, row 2 column 0 is button 6
        fake.pressed[0][1] = true;
        fake.pressed[2][0] = true;
        let mut expander = Mcp23017::new(fake, DEFAULT_ADDRESS);
        let scan = expander.scan().unwrap();
        for id in 1..=8 {
            let button = ButtonId::new(id).unwrap();
            assert_eq!(scan.is_pressed(button), id == 1 || id == 6, "button {}", id);
        }
    }

    type SharedFake = Mutex<NoopRawMutex, Mcp23017<FakeExpander>>;

    fn shared(fake: FakeExpander) -> SharedFake {
        Mutex::new(Mcp23017::new(fake, DEFAULT_ADDRESS))
    }

    /// Runs a matrix scan whenever the LED write waits
    struct ScanWhileWaiting<'a> {
        expander: &'a SharedFake,
        scans: usize,
    }

    impl DelayNs for ScanWhileWaiting<'_> {
        async fn delay_ns(&mut self, _ns: u32) {
            let mut expander = self
                .expander
                .try_lock()
                .expect("expander locked during LED settle");
            expander.scan().unwrap();
            self.scans += 1;
        }
    }

    #[test]
    fn test_set_leds_verified() {
        let expander = shared(FakeExpander::new());
        let mut delay = NoDelay::default();
        block_on(set_leds(&expander, 0b0000_0100, &mut delay)).unwrap();
        assert_eq!(delay.waited_ms(), u64::from(LED_VERIFY_DELAY_MS));
    }

    #[test]
    fn test_set_leds_retries_once() {
        let mut fake = FakeExpander::new();
        fake.stuck = Some((0x01, 1));
        let expander = shared(fake);
        let mut delay = NoDelay::default();
        block_on(set_leds(&expander, 0x01, &mut delay)).unwrap();
        assert_eq!(delay.waited_ms(), 2 * u64::from(LED_VERIFY_DELAY_MS));
    }

    #[test]
    fn test_set_leds_gives_up() {
        let mut fake = FakeExpander::new();
        fake.stuck = Some((0x02, 5));
        let expander = shared(fake);
        let mut delay = NoDelay::default();
        let result = block_on(set_leds(&expander, 0x03, &mut delay));
        assert_eq!(
            result,
            Err(ExpanderError::LedMismatch {
                wanted: 0x03,
                read: 0x01
            })
        );
        let gpioa_writes = expander
            .into_inner()
            .release()
            .writes
            .iter()
            .filter(|(r, _)| *r == reg::GPIOA)
            .count();
        assert_eq!(gpioa_writes, 2);
    }

    #[test]
    fn test_matrix_scans_while_leds_settle() {
        let mut fake = FakeExpander::new();
        fake.stuck = Some((0x04, 1));
        fake.pressed[1][0] = true;
        let expander = shared(fake);
        let mut delay = ScanWhileWaiting {
            expander: &expander,
            scans: 0,
        };
        block_on(set_leds(&expander, 0x04, &mut delay)).unwrap();
        assert_eq!(delay.scans, 2);

        let fake = expander.into_inner().release();
        assert_eq!(fake.registers[reg::GPIOA as usize], 0x04);
    }
}
