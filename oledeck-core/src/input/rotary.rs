//! Quadrature decoding for the rotary encoder
//!
//! Direction is read on every change of the CLK line: clockwise when CLK
//! and DT disagree after the change, counter-clockwise when they agree.

/// One encoder step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Signed delta (+1 clockwise, -1 counter-clockwise)
    pub fn delta(self) -> i8 {
        match self {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => -1,
        }
    }
}

pub struct QuadratureDecoder {
    last_clk: bool,
}

impl QuadratureDecoder {
    /// Start from the CLK level read at startup
    pub fn new(initial_clk: bool) -> Self {
        Self {
            last_clk: initial_clk,
        }
    }

    /// Feed one sample of both lines
    pub fn sample(&mut self, clk: bool, dt: bool) -> Option<Rotation> {
        if clk == self.last_clk {
            return None;
        }
        self.last_clk = clk;
        Some(if clk != dt {
            Rotation::Clockwise
        } else {
            Rotation::CounterClockwise
        })
    }
}
