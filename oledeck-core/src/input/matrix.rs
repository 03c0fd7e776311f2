//! 2 x 4 button matrix
//!
//! Columns are driven from the expander's port B bits 0-1, rows are read
//! back on bits 2-5 with pull-ups. A column is selected by driving it low;
//! a pressed button then pulls its row low as well.

use heapless::Vec;

pub const COLUMNS: usize = 2;
pub const ROWS: usize = 4;
pub const BUTTON_COUNT: usize = COLUMNS * ROWS;

/// Row input bits on port B
pub const ROW_MASK: u8 = 0x3C;

/// Column output bits on port B
pub const COLUMN_MASK: u8 = 0x03;

const ROW_SHIFT: usize = 2;

/// Button number printed on the panel, by `[row][column]`
const LAYOUT: [[u8; COLUMNS]; ROWS] = [[2, 1], [4, 3], [6, 5], [8, 7]];

/// Port B value that selects `column` (driven low, the other high)
pub fn column_drive(column: usize) -> u8 {
    !(1u8 << column) & COLUMN_MASK
}

/// A front-panel button, numbered 1 to 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(u8);

impl ButtonId {
    pub fn new(id: u8) -> Option<Self> {
        (1..=BUTTON_COUNT as u8).contains(&id).then_some(ButtonId(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index for tables
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Port A bit of the LED next to this button
    pub fn led_mask(self) -> u8 {
        1 << (self.0 - 1)
    }
}

/// One full scan; `true` means pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixScan {
    pressed: [[bool; COLUMNS]; ROWS],
}

impl MatrixScan {
    /// Build a scan from the port B reads taken while each column was
    /// selected. Only [`ROW_MASK`] bits are looked at; 0 means pressed.
    pub fn from_column_reads(reads: [u8; COLUMNS]) -> Self {
        let mut pressed = [[false; COLUMNS]; ROWS];
        for (column, read) in reads.iter().enumerate() {
            let rows = read & ROW_MASK;
            for (row, line) in pressed.iter_mut().enumerate() {
                line[column] = (rows >> (row + ROW_SHIFT)) & 1 == 0;
            }
        }
        Self { pressed }
    }

    pub fn is_pressed(&self, id: ButtonId) -> bool {
        self.cells().any(|(cell, pressed)| cell == id && pressed)
    }

    fn cells(&self) -> impl Iterator<Item = (ButtonId, bool)> + '_ {
        self.pressed.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(column, pressed)| (ButtonId(LAYOUT[row][column]), *pressed))
        })
    }
}

/// Edge detector over successive scans
///
/// The first scan only sets the baseline, so a button held (or a line
/// floating) at startup produces no event.
#[derive(Debug, Default)]
pub struct ButtonMatrix {
    previous: Option<MatrixScan>,
}

impl ButtonMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one scan; returns buttons that went from released to pressed
    pub fn update(&mut self, scan: MatrixScan) -> Vec<ButtonId, BUTTON_COUNT> {
        let mut pressed = Vec::new();
        if let Some(previous) = self.previous {
            for ((id, now), (_, before)) in scan.cells().zip(previous.cells()) {
                if now && !before {
                    // at most BUTTON_COUNT cells
                    let _ = pressed.push(id);
                }
            }
        }
        self.previous = Some(scan);
        pressed
    }
}
