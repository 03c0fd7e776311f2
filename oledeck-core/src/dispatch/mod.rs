//! Input routing
//!
//! Turns confirmed input edges into actions. Which action depends only on
//! the button table and on whether the panel is browsing playlists or the
//! player is playing; the dispatcher itself holds no mode state.

pub mod queue;

pub use queue::{ExecQueue, QueueFull};

use log::debug;
use oledeck_protocol::PlayerCommand;

use crate::input::matrix::BUTTON_COUNT;
use crate::input::{ButtonId, InputEvent, Rotation};

/// What a matrix button does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Command(PlayerCommand),
    /// Restart the panel's own service
    RestartService,
    Unassigned,
}

impl ButtonAction {
    /// Parse a configuration name: a player command name,
    /// `restart_service` or `none`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "restart_service" => Some(ButtonAction::RestartService),
            "none" => Some(ButtonAction::Unassigned),
            other => PlayerCommand::from_name(other).map(ButtonAction::Command),
        }
    }
}

/// Button number to action table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    actions: [ButtonAction; BUTTON_COUNT],
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            actions: [
                ButtonAction::Command(PlayerCommand::Play),
                ButtonAction::Command(PlayerCommand::Pause),
                ButtonAction::Command(PlayerCommand::Previous),
                ButtonAction::Command(PlayerCommand::Next),
                ButtonAction::Command(PlayerCommand::Random),
                ButtonAction::RestartService,
                ButtonAction::Command(PlayerCommand::Repeat),
                ButtonAction::Unassigned,
            ],
        }
    }
}

impl ButtonMap {
    pub fn action(&self, id: ButtonId) -> &ButtonAction {
        &self.actions[id.index()]
    }

    pub fn set(&mut self, id: ButtonId, action: ButtonAction) {
        self.actions[id.index()] = action;
    }
}

/// Browser navigation requested by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    Enter,
    Scroll(i8),
    Select,
}

/// Routing decision for one input edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send to the player; `led` lights the button's indicator
    Player { command: PlayerCommand, led: Option<u8> },
    RestartService { led: u8 },
    /// A button with no action still lights its indicator
    Indicate { led: u8 },
    Browse(BrowseAction),
    Ignore,
}

/// Snapshot of the state routing depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchContext {
    pub browsing: bool,
    pub playing: bool,
}

pub struct Dispatcher {
    buttons: ButtonMap,
}

impl Dispatcher {
    pub fn new(buttons: ButtonMap) -> Self {
        Self { buttons }
    }

    pub fn route(&self, event: InputEvent, ctx: DispatchContext) -> Action {
        let action = match event {
            InputEvent::Button(id) => match self.buttons.action(id) {
                ButtonAction::Command(command) => Action::Player {
                    command: command.clone(),
                    led: Some(id.led_mask()),
                },
                ButtonAction::RestartService => Action::RestartService {
                    led: id.led_mask(),
                },
                ButtonAction::Unassigned => Action::Indicate { led: id.led_mask() },
            },
            InputEvent::Rotate(rotation) if ctx.browsing => {
                Action::Browse(BrowseAction::Scroll(rotation.delta()))
            }
            InputEvent::Rotate(rotation) if ctx.playing => Action::Player {
                command: match rotation {
                    Rotation::Clockwise => PlayerCommand::VolumeUp,
                    Rotation::CounterClockwise => PlayerCommand::VolumeDown,
                },
                led: None,
            },
            InputEvent::Rotate(_) => Action::Ignore,
            InputEvent::Press if ctx.browsing => Action::Browse(BrowseAction::Select),
            InputEvent::Press if ctx.playing => Action::Ignore,
            InputEvent::Press => Action::Browse(BrowseAction::Enter),
        };
        debug!("{:?} routed to {:?}", event, action);
        action
    }
}
