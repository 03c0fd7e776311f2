//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod buttons;
pub mod controller;
pub mod encoder;
pub mod exec;

pub use buttons::{buttons_task, SharedExpander};
pub use controller::{controller_task, Ports};
pub use encoder::{encoder_task, EncoderLines};
pub use exec::{exec_task, ExecContext};

use embassy_time::Instant;
use log::warn;
use oledeck_core::input::InputEvent;

use crate::channels::INPUT_CHANNEL;

/// Milliseconds since the executor's time driver started
pub fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Queue an input edge for the controller
fn send_input(event: InputEvent) {
    if INPUT_CHANNEL.try_send(event).is_err() {
        warn!("input channel full, dropping {:?}", event);
    }
}
