//! Inter-task communication channels
//!
//! Static embassy-sync channels between the input tasks, the controller
//! and the exec task. The player worker threads post into
//! [`PLAYER_REPLIES`] and [`COMMAND_DONE`] from outside the executor.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use oledeck_core::input::InputEvent;
use oledeck_core::Job;

use crate::volumio::Reply;

/// Channel capacity for input edges
const INPUT_CHANNEL_SIZE: usize = 16;

/// Channel capacity for player replies
const REPLY_CHANNEL_SIZE: usize = 8;

/// Channel capacity for exec jobs
const EXEC_CHANNEL_SIZE: usize = 16;

/// Debounced edges from the button matrix and the encoder
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// State, queue and playlist answers for the controller
pub static PLAYER_REPLIES: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> =
    Channel::new();

/// Jobs for the concurrency-1 exec task
pub static EXEC_CHANNEL: Channel<CriticalSectionRawMutex, Job, EXEC_CHANNEL_SIZE> =
    Channel::new();

/// Outcome of the player command the exec task is waiting on
pub static COMMAND_DONE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Raised by the exec task whenever its queue runs empty
pub static EXEC_IDLE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
