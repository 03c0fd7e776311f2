//! Debounced input sources
//!
//! Pure edge detectors fed with raw line levels by the daemon's polling
//! tasks. None of them touches hardware or performs an action; each
//! confirmed edge becomes an [`InputEvent`] for the dispatcher.

pub mod matrix;
pub mod press;
pub mod rotary;

pub use matrix::{ButtonId, ButtonMatrix, MatrixScan};
pub use press::PressSwitch;
pub use rotary::{QuadratureDecoder, Rotation};

/// A confirmed user input edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Matrix button went from released to pressed
    Button(ButtonId),
    /// Encoder moved one step
    Rotate(Rotation),
    /// Encoder shaft pushed
    Press,
}
