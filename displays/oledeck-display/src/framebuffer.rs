//! Off-screen 4-bit grayscale buffer
//!
//! Two pixels per byte, left pixel in the high nibble, rows top to bottom.
//! This is the SSD1322 RAM layout, so a present is a straight copy.

use core::convert::Infallible;
use core::ops::RangeInclusive;

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;

pub const PANEL_WIDTH: u32 = 256;
pub const PANEL_HEIGHT: u32 = 64;

/// Bytes per pixel row
pub const ROW_BYTES: usize = PANEL_WIDTH as usize / 2;

/// Bytes per frame
pub const FRAME_BYTES: usize = ROW_BYTES * PANEL_HEIGHT as usize;

#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    data: [u8; FRAME_BYTES],
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; FRAME_BYTES],
        }
    }

    /// Raw frame in panel RAM order
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One pixel row in panel RAM order
    pub fn row(&self, y: u16) -> &[u8] {
        let start = y as usize * ROW_BYTES;
        &self.data[start..start + ROW_BYTES]
    }

    /// Luma at `point`, `None` outside the panel
    pub fn pixel(&self, point: Point) -> Option<Gray4> {
        let (index, high) = Self::locate(point)?;
        let byte = self.data[index];
        let luma = if high { byte >> 4 } else { byte & 0x0F };
        Some(Gray4::new(luma))
    }

    /// Rows that differ from `other`, as one inclusive span
    ///
    /// `None` when the frames are identical.
    pub fn changed_rows(&self, other: &Framebuffer) -> Option<RangeInclusive<u16>> {
        let differs = |y: &u16| self.row(*y) != other.row(*y);
        let first = (0..PANEL_HEIGHT as u16).find(differs)?;
        let last = (0..PANEL_HEIGHT as u16).rev().find(differs)?;
        Some(first..=last)
    }

    pub fn copy_from(&mut self, other: &Framebuffer) {
        self.data.copy_from_slice(&other.data);
    }

    /// Number of lit pixels
    pub fn lit_pixels(&self) -> usize {
        self.data
            .iter()
            .map(|b| usize::from(b >> 4 != 0) + usize::from(b & 0x0F != 0))
            .sum()
    }

    fn locate(point: Point) -> Option<(usize, bool)> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= PANEL_WIDTH || y >= PANEL_HEIGHT {
            return None;
        }
        let index = y as usize * ROW_BYTES + x as usize / 2;
        Some((index, x % 2 == 0))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH, PANEL_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let Some((index, high)) = Self::locate(point) else {
                continue;
            };
            let luma = color.luma() & 0x0F;
            let byte = &mut self.data[index];
            *byte = if high {
                (*byte & 0x0F) | (luma << 4)
            } else {
                (*byte & 0xF0) | luma
            };
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let luma = color.luma() & 0x0F;
        self.data.fill((luma << 4) | luma);
        Ok(())
    }
}
