//! Player state snapshot

use heapless::String;

use crate::text::compact;

/// Capacity of title/artist/album strings
pub const TEXT_CAPACITY: usize = 128;

/// Capacity of format and codec strings
pub const SHORT_CAPACITY: usize = 24;

/// Capacity of the composed footer line
pub const FOOTER_CAPACITY: usize = 96;

pub type Text = String<TEXT_CAPACITY>;
pub type ShortText = String<SHORT_CAPACITY>;
pub type Footer = String<FOOTER_CAPACITY>;

/// Transport status reported by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportStatus {
    Play,
    Pause,
    #[default]
    Stop,
}

impl TransportStatus {
    /// Parse the player's status string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "play" => Some(TransportStatus::Play),
            "pause" => Some(TransportStatus::Pause),
            "stop" => Some(TransportStatus::Stop),
            _ => None,
        }
    }

    pub fn is_playing(self) -> bool {
        self == TransportStatus::Play
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportStatus::Play => "play",
            TransportStatus::Pause => "pause",
            TransportStatus::Stop => "stop",
        }
    }
}

/// Sample rate, bit depth and bit rate as reported (e.g. "44.1 kHz")
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioFormat {
    pub sample_rate: ShortText,
    pub bit_depth: ShortText,
    pub bit_rate: ShortText,
}

impl AudioFormat {
    /// True when none of the three fields is present
    pub fn is_empty(&self) -> bool {
        self.sample_rate.is_empty() && self.bit_depth.is_empty() && self.bit_rate.is_empty()
    }

    /// Non-empty fields with their whitespace removed, in display order
    pub fn parts(&self) -> impl Iterator<Item = ShortText> + '_ {
        [&self.sample_rate, &self.bit_depth, &self.bit_rate]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| compact(s))
    }
}

/// One point-in-time read of the player
///
/// Snapshots are values: the reducer replaces them wholesale and never
/// edits one in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub title: Text,
    pub artist: Text,
    pub album: Text,
    pub status: TransportStatus,
    /// Volume 0-100, absent when the output has no volume control
    pub volume: Option<u8>,
    pub mute: bool,
    /// Position within the track in milliseconds
    pub seek_ms: Option<u64>,
    /// Track length in seconds (may be fractional)
    pub duration_s: Option<f64>,
    pub format: AudioFormat,
    /// Codec or source label ("flac", "webradio", ...)
    pub track_type: ShortText,
    pub repeat: bool,
    pub repeat_single: bool,
    pub random: bool,
    /// Format of the first queue entry, used when `format` is empty
    pub queue_fallback: Option<AudioFormat>,
}

impl PlayerSnapshot {
    /// Same title, artist and album
    pub fn same_track(&self, other: &PlayerSnapshot) -> bool {
        self.title == other.title && self.artist == other.artist && self.album == other.album
    }

    /// Same sample rate, bit depth, bit rate and codec
    pub fn same_format(&self, other: &PlayerSnapshot) -> bool {
        self.format == other.format && self.track_type == other.track_type
    }

    /// Same repeat/random flags
    pub fn same_play_modes(&self, other: &PlayerSnapshot) -> bool {
        self.repeat == other.repeat
            && self.repeat_single == other.repeat_single
            && self.random == other.random
    }

    /// The snapshot has no format fields of its own
    pub fn needs_queue_fallback(&self) -> bool {
        self.format.is_empty()
    }

    /// Footer line: codec followed by the compacted format fields
    ///
    /// "flac 44.1kHz 16bit 1411kbps"
    pub fn footer(&self) -> Footer {
        let format = match (&self.queue_fallback, self.format.is_empty()) {
            (Some(fallback), true) => fallback,
            _ => &self.format,
        };

        let mut footer = Footer::new();
        let words = core::iter::once(compact::<SHORT_CAPACITY>(&self.track_type))
            .filter(|s| !s.is_empty())
            .chain(format.parts());
        for word in words {
            if !footer.is_empty() && footer.push(' ').is_err() {
                break;
            }
            if footer.push_str(&word).is_err() {
                break;
            }
        }
        footer
    }
}
