//! Clock face: a centered, triple-size `HH:mm`

use core::fmt::Write;

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::scaled::Scaled;
use crate::text::{centered, shade, style, LARGE};

const SCALE: u32 = 3;

/// Pixels the digits sit above the vertical center
const LIFT: i32 = 10;

/// Wall-clock time shown on the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    pub fn label(&self) -> String<5> {
        let mut s = String::new();
        let _ = write!(s, "{:02}:{:02}", self.hour, self.minute);
        s
    }
}

/// Stateless clock renderer
pub struct ClockFace;

impl ClockFace {
    pub fn draw<D>(time: ClockTime, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        target.clear(Gray4::BLACK)?;

        let label = time.label();
        let size = target.bounding_box().size;
        let glyph = LARGE.character_size;
        let width = label.len() as u32 * glyph.width * SCALE;
        let height = glyph.height * SCALE;
        let origin = Point::new(
            centered(width, size.width),
            centered(height, size.height) - LIFT,
        );

        let mut scaled = Scaled::new(target, origin, SCALE);
        Text::with_baseline(&label, Point::zero(), style(LARGE, shade::CLOCK), Baseline::Top)
            .draw(&mut scaled)?;
        Ok(())
    }
}
