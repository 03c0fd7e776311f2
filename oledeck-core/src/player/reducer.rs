//! Snapshot reducer
//!
//! Exactly one state request is outstanding at a time. The first snapshot
//! after startup (or after the player stopped answering) only seeds the
//! reducer and asks for another one straight away; every later snapshot is
//! diffed against the one before it.

use heapless::Vec;
use log::{debug, info, warn};
use oledeck_protocol::{AudioFormat, PlayerSnapshot, TransportStatus};

use crate::config::PollConfig;
use crate::player::seek::{format_seek, SeekDisplay};

/// A field group that differs between two consecutive snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerEvent {
    /// Title, artist or album
    TrackChanged,
    StatusChanged(TransportStatus),
    /// Position or duration
    SeekChanged,
    /// Volume or mute
    VolumeChanged,
    /// Anything that feeds the footer line
    FormatChanged,
    /// Repeat, repeat-single or random
    PlayModesChanged,
}

pub type Events = Vec<PlayerEvent, 6>;

/// Result of diffing a snapshot against its predecessor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reduction {
    pub events: Events,
    /// The user or the player did something worth waking the panel for
    pub exit_sleep: bool,
}

impl Reduction {
    pub fn contains(&self, event: PlayerEvent) -> bool {
        self.events.contains(&event)
    }
}

/// What a snapshot did to the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// First snapshot of a session; nothing to compare against
    Seeded,
    Reduced(Reduction),
}

pub struct StateReducer {
    current: Option<PlayerSnapshot>,
    previous: Option<PlayerSnapshot>,
    seek: SeekDisplay,
    seeded: bool,
    in_flight: bool,
    next_poll_ms: u64,
    queue_requested: bool,
    config: PollConfig,
}

impl StateReducer {
    pub fn new(config: PollConfig) -> Self {
        Self {
            current: None,
            previous: None,
            seek: SeekDisplay::default(),
            seeded: false,
            in_flight: false,
            next_poll_ms: 0,
            queue_requested: false,
            config,
        }
    }

    /// Decide whether to send a state request now
    ///
    /// Returns true at most once per poll period and never while another
    /// request is outstanding. Every request is answered exactly once,
    /// through [`on_snapshot`](Self::on_snapshot) or
    /// [`on_request_failed`](Self::on_request_failed); the client's own
    /// timeout turns a hung player into a failure.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.in_flight || now_ms < self.next_poll_ms {
            return false;
        }

        self.in_flight = true;
        self.next_poll_ms = now_ms + self.config.state_poll_ms;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn current(&self) -> Option<&PlayerSnapshot> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&PlayerSnapshot> {
        self.previous.as_ref()
    }

    pub fn seek(&self) -> &SeekDisplay {
        &self.seek
    }

    pub fn status(&self) -> TransportStatus {
        self.current
            .as_ref()
            .map(|s| s.status)
            .unwrap_or_default()
    }

    /// Take in a decoded snapshot
    pub fn on_snapshot(&mut self, mut snapshot: PlayerSnapshot, now_ms: u64) -> Ingest {
        self.in_flight = false;
        self.seek = format_seek(snapshot.seek_ms, snapshot.duration_s);

        if !self.seeded {
            info!(
                "player state seeded: {} ({})",
                snapshot.title.as_str(),
                snapshot.status.as_str()
            );
            self.seeded = true;
            self.previous = None;
            self.current = Some(snapshot);
            self.queue_requested = false;
            // ask again right away so the first diff has a baseline
            self.next_poll_ms = now_ms;
            return Ingest::Seeded;
        }

        let previous = self.current.take();
        if let Some(prev) = &previous {
            if prev.same_track(&snapshot) && snapshot.queue_fallback.is_none() {
                snapshot.queue_fallback = prev.queue_fallback.clone();
            }
        }

        let reduction = diff(previous.as_ref(), &snapshot);
        if reduction.contains(PlayerEvent::TrackChanged) {
            self.queue_requested = false;
        }
        if !reduction.events.is_empty() {
            debug!("player events {:?}", reduction.events.as_slice());
        }

        self.previous = previous;
        self.current = Some(snapshot);
        Ingest::Reduced(reduction)
    }

    /// The state request failed outright; reseed on the next answer
    pub fn on_request_failed(&mut self) {
        self.in_flight = false;
        if self.seeded {
            warn!("player unreachable, will reseed");
        }
        self.seeded = false;
    }

    /// Whether the current track needs its format from the queue
    ///
    /// True at most once per track.
    pub fn wants_queue(&mut self) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        if self.queue_requested
            || !current.needs_queue_fallback()
            || current.queue_fallback.is_some()
        {
            return false;
        }
        self.queue_requested = true;
        true
    }

    /// Attach the queue's format to the current snapshot
    ///
    /// Returns true when the footer text changed.
    pub fn on_queue_format(&mut self, format: Option<AudioFormat>) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let next = PlayerSnapshot {
            queue_fallback: format,
            ..current.clone()
        };
        let changed = next.footer() != current.footer();
        self.current = Some(next);
        changed
    }
}

fn diff(previous: Option<&PlayerSnapshot>, next: &PlayerSnapshot) -> Reduction {
    let mut reduction = Reduction::default();

    let Some(prev) = previous else {
        let _ = reduction.events.extend_from_slice(&[
            PlayerEvent::TrackChanged,
            PlayerEvent::StatusChanged(next.status),
            PlayerEvent::SeekChanged,
            PlayerEvent::VolumeChanged,
            PlayerEvent::FormatChanged,
            PlayerEvent::PlayModesChanged,
        ]);
        reduction.exit_sleep = true;
        return reduction;
    };

    let track = !prev.same_track(next);
    let status = prev.status != next.status;
    let seek = prev.seek_ms != next.seek_ms || prev.duration_s != next.duration_s;
    let volume = prev.volume != next.volume || prev.mute != next.mute;
    let format = !prev.same_format(next) || prev.footer() != next.footer();
    let modes = !prev.same_play_modes(next);

    let flagged = [
        (track, PlayerEvent::TrackChanged),
        (status, PlayerEvent::StatusChanged(next.status)),
        (seek, PlayerEvent::SeekChanged),
        (volume, PlayerEvent::VolumeChanged),
        (format, PlayerEvent::FormatChanged),
        (modes, PlayerEvent::PlayModesChanged),
    ];
    for (_, event) in flagged.iter().filter(|(hit, _)| *hit) {
        let _ = reduction.events.push(*event);
    }

    // a moving position while stopped or paused means someone is seeking
    let seeking = !next.status.is_playing() && prev.seek_ms != next.seek_ms;
    reduction.exit_sleep = track || volume || next.status.is_playing() || seeking;
    reduction
}
