//! Playlist browser pages

use core::ops::Range;

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use oledeck_protocol::Playlist;

use crate::text::{centered, shade, style, text_width, LARGE, SMALL};

/// Height of one list row
pub const ROW_HEIGHT: u32 = 12;

const MARKER_X: i32 = 2;
const NAME_X: i32 = 14;

/// What the browser has to show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaylistPage<'a> {
    /// Listing requested, no answer yet
    Loading { attempt: u8 },
    List { entries: &'a [Playlist], cursor: usize },
    /// Fetch exhausted or empty
    Error(&'a str),
}

/// Rows that fit on a panel `height` pixels tall
pub fn visible_rows(height: u32) -> usize {
    (height / ROW_HEIGHT).max(1) as usize
}

/// Entries shown for `cursor`, keeping it near the middle of the window
pub fn window(len: usize, cursor: usize, rows: usize) -> Range<usize> {
    let start = cursor
        .saturating_sub(rows / 2)
        .min(len.saturating_sub(rows));
    start..(start + rows).min(len)
}

impl PlaylistPage<'_> {
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        target.clear(Gray4::BLACK)?;
        let size = target.bounding_box().size;

        match *self {
            PlaylistPage::Loading { attempt } => {
                let label = if attempt > 1 {
                    "Loading playlists (retrying)"
                } else {
                    "Loading playlists"
                };
                message(label, size, target)
            }
            PlaylistPage::Error(text) => message(text, size, target),
            PlaylistPage::List { entries, cursor } => {
                let rows = window(entries.len(), cursor, visible_rows(size.height));
                let text_style = style(LARGE, shade::TEXT);
                for (row, index) in rows.enumerate() {
                    let y = row as i32 * ROW_HEIGHT as i32;
                    let entry = &entries[index];
                    Text::with_baseline(&entry.name, Point::new(NAME_X, y), text_style, Baseline::Top)
                        .draw(target)?;
                    if index == cursor {
                        Text::with_baseline(">", Point::new(MARKER_X, y), text_style, Baseline::Top)
                            .draw(target)?;
                        let underline = y + ROW_HEIGHT as i32 - 1;
                        let end = NAME_X + text_width(&entry.name, LARGE) as i32;
                        Line::new(Point::new(NAME_X, underline), Point::new(end, underline))
                            .into_styled(PrimitiveStyle::with_stroke(shade::DIM, 1))
                            .draw(target)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn message<D>(text: &str, size: Size, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Gray4>,
{
    let x = centered(text_width(text, SMALL), size.width);
    let y = centered(SMALL.character_size.height, size.height);
    Text::with_baseline(text, Point::new(x, y), style(SMALL, shade::TEXT), Baseline::Top)
        .draw(target)?;
    Ok(())
}
