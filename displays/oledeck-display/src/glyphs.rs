//! Status icons drawn from primitives
//!
//! Every icon fits a 10x10 box whose top-left corner is `at`.

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, Triangle};
use oledeck_protocol::TransportStatus;

pub const ICON_SIZE: u32 = 10;

/// Speaker: a small box with a flared cone
pub fn speaker<D>(target: &mut D, at: Point, color: Gray4) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Gray4>,
{
    let fill = PrimitiveStyle::with_fill(color);
    Rectangle::new(at + Point::new(0, 3), Size::new(3, 4))
        .into_styled(fill)
        .draw(target)?;
    Triangle::new(at + Point::new(2, 5), at + Point::new(7, 0), at + Point::new(7, 9))
        .into_styled(fill)
        .draw(target)
}

/// Repeat loop; `single` adds a bar for repeat-one
pub fn repeat<D>(target: &mut D, at: Point, single: bool, color: Gray4) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Gray4>,
{
    let stroke = PrimitiveStyle::with_stroke(color, 1);
    Rectangle::new(at + Point::new(0, 2), Size::new(9, 6))
        .into_styled(stroke)
        .draw(target)?;
    // arrow head on the top edge
    Triangle::new(at + Point::new(5, 0), at + Point::new(5, 4), at + Point::new(7, 2))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)?;
    if single {
        Line::new(at + Point::new(4, 4), at + Point::new(4, 6))
            .into_styled(stroke)
            .draw(target)?;
    }
    Ok(())
}

/// Play triangle, pause bars or stop square
pub fn transport<D>(
    target: &mut D,
    at: Point,
    status: TransportStatus,
    color: Gray4,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Gray4>,
{
    let fill = PrimitiveStyle::with_fill(color);
    match status {
        TransportStatus::Play => Triangle::new(at, at + Point::new(0, 9), at + Point::new(8, 4))
            .into_styled(fill)
            .draw(target),
        TransportStatus::Pause => {
            Rectangle::new(at + Point::new(1, 0), Size::new(3, 10))
                .into_styled(fill)
                .draw(target)?;
            Rectangle::new(at + Point::new(6, 0), Size::new(3, 10))
                .into_styled(fill)
                .draw(target)
        }
        TransportStatus::Stop => Rectangle::new(at + Point::new(1, 1), Size::new(8, 8))
            .into_styled(fill)
            .draw(target),
    }
}
