//! Transport commands sent to the player

use heapless::Vec;

use crate::playlist::PlaylistName;

/// Query parameters for `/api/v1/commands/`
pub type CommandQuery<'a> = Vec<(&'static str, &'a str), 2>;

/// A named player verb
///
/// The player never acknowledges a command; its effect shows up in the
/// next state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Stop,
    Previous,
    Next,
    /// Toggle shuffle
    Random,
    /// Toggle repeat
    Repeat,
    ClearQueue,
    VolumeUp,
    VolumeDown,
    /// Replace the queue with a stored playlist and start it
    PlayPlaylist(PlaylistName),
}

impl PlayerCommand {
    /// Look up a parameterless command by its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "play" => Some(PlayerCommand::Play),
            "pause" => Some(PlayerCommand::Pause),
            "stop" => Some(PlayerCommand::Stop),
            "previous" => Some(PlayerCommand::Previous),
            "next" => Some(PlayerCommand::Next),
            "random" => Some(PlayerCommand::Random),
            "repeat" => Some(PlayerCommand::Repeat),
            "clear" => Some(PlayerCommand::ClearQueue),
            "volume_up" => Some(PlayerCommand::VolumeUp),
            "volume_down" => Some(PlayerCommand::VolumeDown),
            _ => None,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Play => "play",
            PlayerCommand::Pause => "pause",
            PlayerCommand::Stop => "stop",
            PlayerCommand::Previous => "previous",
            PlayerCommand::Next => "next",
            PlayerCommand::Random => "random",
            PlayerCommand::Repeat => "repeat",
            PlayerCommand::ClearQueue => "clear",
            PlayerCommand::VolumeUp => "volume_up",
            PlayerCommand::VolumeDown => "volume_down",
            PlayerCommand::PlayPlaylist(_) => "play_playlist",
        }
    }

    /// REST query parameters for this command
    pub fn query(&self) -> CommandQuery<'_> {
        let mut q = CommandQuery::new();
        let (cmd, extra) = match self {
            PlayerCommand::Play => ("play", None),
            PlayerCommand::Pause => ("pause", None),
            PlayerCommand::Stop => ("stop", None),
            PlayerCommand::Previous => ("prev", None),
            PlayerCommand::Next => ("next", None),
            PlayerCommand::Random => ("random", None),
            PlayerCommand::Repeat => ("repeat", None),
            PlayerCommand::ClearQueue => ("clearQueue", None),
            PlayerCommand::VolumeUp => ("volume", Some(("volume", "plus"))),
            PlayerCommand::VolumeDown => ("volume", Some(("volume", "minus"))),
            PlayerCommand::PlayPlaylist(name) => ("playplaylist", Some(("name", name.as_str()))),
        };
        // Capacity is 2 and at most two pairs are pushed
        let _ = q.push(("cmd", cmd));
        if let Some(pair) = extra {
            let _ = q.push(pair);
        }
        q
    }
}
