//! Fonts, shades and text metrics

use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_8X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;
use embedded_graphics::prelude::*;

/// Title, artist and playlist rows
pub const LARGE: &MonoFont<'static> = &FONT_8X13;

/// Footer, volume level and seek label
pub const SMALL: &MonoFont<'static> = &FONT_6X10;

/// Luma levels used across renderers
pub mod shade {
    use embedded_graphics::pixelcolor::Gray4;

    pub const TEXT: Gray4 = Gray4::new(0x0C);
    pub const DIM: Gray4 = Gray4::new(0x06);
    pub const BORDER: Gray4 = Gray4::new(0x04);
    pub const FILL: Gray4 = Gray4::new(0x08);
    pub const CLOCK: Gray4 = Gray4::new(0x0F);
    pub const SNAKE: Gray4 = Gray4::new(0x02);
}

pub fn style(font: &'static MonoFont<'static>, color: Gray4) -> MonoTextStyle<'static, Gray4> {
    MonoTextStyle::new(font, color)
}

/// Rendered width of `text` in pixels
pub fn text_width(text: &str, font: &'static MonoFont<'static>) -> u32 {
    style(font, shade::TEXT)
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size
        .width
}

/// X that centers `width` pixels on a `span`-wide area (negative if wider)
pub fn centered(width: u32, span: u32) -> i32 {
    (span as i32 - width as i32) / 2
}
