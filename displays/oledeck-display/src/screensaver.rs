//! Screensaver: a snake sweeping the panel in 3-pixel rows
//!
//! The head runs across the panel, reversing direction at each edge and
//! dropping one row per pass. Seven pickups are scattered at random; each
//! one the head passes lengthens the tail. When the head leaves the bottom
//! edge the animation starts over with fresh pickups.

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use heapless::{Deque, Vec};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::framebuffer::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::text::shade;

pub const PICKUPS: usize = 7;
const ROW_STEP: i32 = 3;
const START_TAIL: usize = 10;
const GROWTH: usize = 5;
const TAIL_CAPACITY: usize = START_TAIL + GROWTH * PICKUPS;

pub struct Snake {
    count: u32,
    flip: bool,
    tail: Deque<Point, TAIL_CAPACITY>,
    tail_len: usize,
    pickups: Vec<Point, PICKUPS>,
    rng: SmallRng,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mut snake = Self {
            count: 0,
            flip: false,
            tail: Deque::new(),
            tail_len: START_TAIL,
            pickups: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        };
        snake.reset();
        snake
    }

    fn reset(&mut self) {
        self.count = 0;
        self.flip = false;
        self.tail.clear();
        self.tail_len = START_TAIL;
        self.pickups.clear();
        for _ in 0..PICKUPS {
            let x = self.rng.random_range(0..PANEL_WIDTH as i32);
            let y = self.rng.random_range(0..(PANEL_HEIGHT as i32 / ROW_STEP)) * ROW_STEP;
            let _ = self.pickups.push(Point::new(x, y));
        }
    }

    /// Move the head one step
    pub fn advance(&mut self) {
        if self.head().is_some_and(|h| h.y > PANEL_HEIGHT as i32) {
            self.reset();
        }

        let width = PANEL_WIDTH;
        if self.count % width == 0 {
            self.flip = !self.flip;
        }
        let column = (self.count % width) as i32;
        let x = if self.flip {
            column + 1
        } else {
            width as i32 - column
        };
        let y = (self.count / width) as i32 * ROW_STEP;
        let head = Point::new(x, y);

        while self.tail.len() >= self.tail_len {
            self.tail.pop_front();
        }
        let _ = self.tail.push_back(head);

        let flip = self.flip;
        let before = self.pickups.len();
        self.pickups.retain(|p| {
            let passed = if flip { x >= p.x } else { x <= p.x };
            !(passed && y >= p.y)
        });
        let eaten = before - self.pickups.len();
        self.tail_len = (self.tail_len + eaten * GROWTH).min(TAIL_CAPACITY);

        self.count += 1;
    }

    pub fn head(&self) -> Option<Point> {
        self.tail.back().copied()
    }

    pub fn tail_len(&self) -> usize {
        self.tail_len
    }

    pub fn pickups(&self) -> &[Point] {
        &self.pickups
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        target.clear(Gray4::BLACK)?;
        let fill = PrimitiveStyle::with_fill(shade::SNAKE);
        for segment in self.tail.iter() {
            Rectangle::new(*segment - Point::new(0, 1), Size::new(2, 3))
                .into_styled(fill)
                .draw(target)?;
        }
        for pickup in self.pickups.iter() {
            Pixel(*pickup, shade::SNAKE).draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Framebuffer;

    #[test]
    fn test_pickups_on_row_grid() {
        let snake = Snake::new(7);
        assert_eq!(snake.pickups().len(), PICKUPS);
        for p in snake.pickups() {
            assert_eq!(p.y % ROW_STEP, 0);
            assert!(p.x >= 0 && p.x < PANEL_WIDTH as i32);
        }
    }

    #[test]
    fn test_head_sweeps_and_drops_rows() {
        let mut snake = Snake::new(1);
        snake.advance();
        assert_eq!(snake.head(), Some(Point::new(1, 0)));
        for _ in 1..PANEL_WIDTH {
            snake.advance();
        }
        assert_eq!(snake.head(), Some(Point::new(PANEL_WIDTH as i32, 0)));
        // next pass runs right to left one row down
        snake.advance();
        assert_eq!(snake.head(), Some(Point::new(PANEL_WIDTH as i32, ROW_STEP)));
        snake.advance();
        assert_eq!(snake.head(), Some(Point::new(PANEL_WIDTH as i32 - 1, ROW_STEP)));
    }

    #[test]
    fn test_tail_bounded_and_grows() {
        let mut snake = Snake::new(3);
        for _ in 0..(PANEL_WIDTH * 4) {
            snake.advance();
            assert!(snake.tail.len() <= snake.tail_len());
        }
        let eaten = PICKUPS - snake.pickups().len();
        assert_eq!(snake.tail_len(), START_TAIL + eaten * GROWTH);
    }

    #[test]
    fn test_resets_after_bottom_edge() {
        let mut snake = Snake::new(9);
        let frames = PANEL_WIDTH * (PANEL_HEIGHT / ROW_STEP as u32 + 2);
        let mut previous = 0;
        let mut deepest = 0;
        let mut reset_seen = false;
        for _ in 0..frames {
            snake.advance();
            let y = snake.head().map_or(0, |h| h.y);
            if y < previous {
                reset_seen = true;
                assert_eq!(y, 0);
                assert_eq!(snake.tail.len(), 1);
            }
            previous = y;
            deepest = deepest.max(y);
        }
        assert!(reset_seen);
        assert!(deepest > PANEL_HEIGHT as i32);
        assert!(deepest <= PANEL_HEIGHT as i32 + ROW_STEP);
    }

    #[test]
    fn test_draw_lights_tail() {
        let mut snake = Snake::new(5);
        for _ in 0..12 {
            snake.advance();
        }
        let mut fb = Framebuffer::new();
        snake.draw(&mut fb).unwrap();
        assert!(fb.lit_pixels() > 0);
    }
}
