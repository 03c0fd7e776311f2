//! Now-playing screen
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Title (marquee)              │
//! │                Artist (marquee)              │
//! │                 01:05 / 03:05                │
//! │ ◀) 42        flac 44.1kHz 16bit       ⟲  ▶   │
//! │ [██████████████░░░░░░░░░░░░░░░░░░░░░░░░░░░░] │
//! └──────────────────────────────────────────────┘
//! ```

use core::fmt::Write;

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use oledeck_protocol::{Footer, PlayerSnapshot, Text as TrackText};

use crate::framebuffer::PANEL_WIDTH;
use crate::glyphs;
use crate::text::{centered, shade, style, text_width, LARGE, SMALL};

/// Frames a long line stays still before it starts scrolling
pub const HOLD_FRAMES: u16 = 20;

const TITLE_Y: i32 = 0;
const ARTIST_Y: i32 = 15;
const SEEK_Y: i32 = 31;
const ICON_Y: i32 = 43;
const BAR_TOP: i32 = 56;
const BAR_HEIGHT: u32 = 4;
const BAR_LEFT: i32 = 3;
const VOLUME_X: i32 = 4;
const REPEAT_X: i32 = 228;
const STATUS_X: i32 = 244;

/// Seek position as shown under the title
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekBar<'a> {
    /// "mm:ss / mm:ss"
    pub label: &'a str,
    /// Progress in [0, 1]
    pub ratio: f32,
}

/// One horizontally scrolling line of text
///
/// Text that fits is centered. Text wider than the panel holds for
/// [`HOLD_FRAMES`] frames, then moves left one pixel per frame; once fully
/// off the left edge it re-enters from the right edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marquee {
    text: TrackText,
    width: u32,
    offset: i32,
    hold: u16,
}

impl Marquee {
    pub fn new(text: &str) -> Self {
        let mut m = Self::default();
        m.restart(text);
        m
    }

    /// Replace the text and scroll it from the start
    pub fn restart(&mut self, text: &str) {
        self.text = oledeck_protocol::text::bounded(text);
        self.width = text_width(&self.text, LARGE);
        self.offset = 0;
        self.hold = HOLD_FRAMES;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scrolls(&self) -> bool {
        self.width > PANEL_WIDTH
    }

    /// Advance one frame
    pub fn advance(&mut self) {
        if !self.scrolls() {
            return;
        }
        if self.hold > 0 {
            self.hold -= 1;
            return;
        }
        self.offset -= 1;
        if self.offset < -(self.width as i32) {
            self.offset = PANEL_WIDTH as i32;
        }
    }

    /// Left edge of the text this frame
    pub fn x(&self) -> i32 {
        if self.scrolls() {
            self.offset
        } else {
            centered(self.width, PANEL_WIDTH)
        }
    }

    fn draw<D>(&self, y: i32, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        if self.text.is_empty() {
            return Ok(());
        }
        Text::with_baseline(
            &self.text,
            Point::new(self.x(), y),
            style(LARGE, shade::TEXT),
            Baseline::Top,
        )
        .draw(target)?;
        Ok(())
    }
}

/// Playback mode state: title cache, scroll offsets and footer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackView {
    pub title: Marquee,
    pub artist: Marquee,
    footer: Footer,
}

impl PlaybackView {
    pub fn new(title: &str, artist: &str, footer: &str) -> Self {
        let mut view = Self {
            title: Marquee::new(title),
            artist: Marquee::new(artist),
            footer: Footer::new(),
        };
        view.set_footer(footer);
        view
    }

    /// New track: both lines restart from their initial position
    pub fn set_track(&mut self, title: &str, artist: &str) {
        self.title.restart(title);
        self.artist.restart(artist);
    }

    pub fn set_footer(&mut self, footer: &str) {
        self.footer = oledeck_protocol::text::bounded(footer);
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Advance the marquees one frame
    pub fn advance(&mut self) {
        self.title.advance();
        self.artist.advance();
    }

    pub fn draw<D>(
        &self,
        snapshot: &PlayerSnapshot,
        seek: SeekBar<'_>,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        target.clear(Gray4::BLACK)?;
        let width = target.bounding_box().size.width;
        let small = style(SMALL, shade::DIM);

        self.title.draw(TITLE_Y, target)?;
        self.artist.draw(ARTIST_Y, target)?;

        // volume
        if let Some(volume) = snapshot.volume {
            let mut level: String<4> = String::new();
            if snapshot.mute || volume == 0 {
                let _ = level.push('X');
            } else {
                let _ = write!(level, "{}", volume);
            }
            glyphs::speaker(target, Point::new(VOLUME_X, ICON_Y), shade::DIM)?;
            Text::with_baseline(&level, Point::new(VOLUME_X + 12, ICON_Y), small, Baseline::Top)
                .draw(target)?;
        }

        if snapshot.repeat_single || snapshot.repeat {
            glyphs::repeat(
                target,
                Point::new(REPEAT_X, ICON_Y),
                snapshot.repeat_single,
                shade::DIM,
            )?;
        }
        glyphs::transport(target, Point::new(STATUS_X, ICON_Y), snapshot.status, shade::TEXT)?;

        if !self.footer.is_empty() {
            let x = centered(text_width(&self.footer, SMALL), width);
            Text::with_baseline(&self.footer, Point::new(x, ICON_Y), small, Baseline::Top)
                .draw(target)?;
        }

        // seek label and progress bar
        let x = centered(text_width(seek.label, SMALL), width);
        Text::with_baseline(seek.label, Point::new(x, SEEK_Y), small, Baseline::Top)
            .draw(target)?;

        let bar_width = width.saturating_sub(BAR_LEFT as u32 + 5);
        Rectangle::new(Point::new(BAR_LEFT, BAR_TOP), Size::new(bar_width, BAR_HEIGHT))
            .into_styled(PrimitiveStyle::with_stroke(shade::BORDER, 1))
            .draw(target)?;
        let fill = (seek.ratio.clamp(0.0, 1.0) * bar_width as f32) as u32;
        if fill > 0 {
            Rectangle::new(Point::new(BAR_LEFT, BAR_TOP), Size::new(fill, BAR_HEIGHT))
                .into_styled(PrimitiveStyle::with_fill(shade::FILL))
                .draw(target)?;
        }
        Ok(())
    }
}
