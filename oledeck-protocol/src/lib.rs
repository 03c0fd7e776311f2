//! Volumio player protocol
//!
//! This crate defines the values exchanged with the Volumio player service:
//! state snapshots, transport commands and playlist listings, plus the JSON
//! decoding of the REST responses that carry them.
//!
//! # Endpoints
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────┐
//! │ GET /api/v1/getState     │ PlayerSnapshot                   │
//! │ GET /api/v1/getQueue     │ AudioFormat of the first entry   │
//! │ GET /api/v1/browse       │ PlaylistList (uri=playlists)     │
//! │ GET /api/v1/commands/    │ PlayerCommand query parameters   │
//! └──────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! Decoding is forgiving: Volumio reports numbers as strings on some
//! services and omits fields freely. A response that cannot be decoded at
//! all is an error; a listing that cannot be decoded is simply empty.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod command;
pub mod json;
pub mod playlist;
pub mod snapshot;
pub mod text;

pub use command::PlayerCommand;
pub use json::{parse_playlists, parse_queue_format, parse_state, ProtocolError};
pub use playlist::{Playlist, PlaylistList, PlaylistName, MAX_PLAYLISTS};
pub use snapshot::{AudioFormat, Footer, PlayerSnapshot, ShortText, Text, TransportStatus};
