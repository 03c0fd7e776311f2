//! Integer pixel scaling
//!
//! Wraps a draw target so that every pixel drawn through it becomes a
//! `scale` x `scale` block. Used for the large clock digits.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub struct Scaled<'a, D> {
    inner: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<'a, D: DrawTarget> Scaled<'a, D> {
    /// Pixels at `p` land at `origin + p * scale` on `inner`
    pub fn new(inner: &'a mut D, origin: Point, scale: u32) -> Self {
        Self {
            inner,
            origin,
            scale: scale.max(1),
        }
    }
}

impl<D: DrawTarget> Dimensions for Scaled<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        let size = self.inner.bounding_box().size;
        Rectangle::new(Point::zero(), Size::new(size.width / self.scale, size.height / self.scale))
    }
}

impl<D: DrawTarget> DrawTarget for Scaled<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let s = self.scale as i32;
        for Pixel(p, color) in pixels {
            let top_left = self.origin + Point::new(p.x * s, p.y * s);
            self.inner
                .fill_solid(&Rectangle::new(top_left, Size::new_equal(self.scale)), color)?;
        }
        Ok(())
    }
}
