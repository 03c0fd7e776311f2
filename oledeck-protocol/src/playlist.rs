//! Stored playlists

use heapless::{String, Vec};

/// Most playlists kept from one listing
pub const MAX_PLAYLISTS: usize = 64;

pub const NAME_CAPACITY: usize = 64;
pub const URI_CAPACITY: usize = 128;

pub type PlaylistName = String<NAME_CAPACITY>;

/// One entry of the player's playlist library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: PlaylistName,
    pub uri: String<URI_CAPACITY>,
}

/// A complete listing, replaced as a whole on every successful fetch
pub type PlaylistList = Vec<Playlist, MAX_PLAYLISTS>;
