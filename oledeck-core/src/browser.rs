//! Playlist browser
//!
//! Holds one listing fetch with its retry budget, the entries once they
//! arrive and the cursor. The browser never talks to the player itself:
//! [`PlaylistBrowser::take_request`] tells the caller when to send a
//! listing request and the answer comes back through
//! [`PlaylistBrowser::on_listing`].

use log::{info, warn};
use oledeck_display::PlaylistPage;
use oledeck_protocol::{Playlist, PlaylistList};

use crate::config::BrowseConfig;

pub const EMPTY_TEXT: &str = "No Playlists Found";
pub const FAILED_TEXT: &str = "Failed to load playlists";

/// Why the browser shows an error page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// The player answered with no playlists
    Empty,
    /// Every attempt timed out or failed
    Exhausted,
}

impl FetchError {
    pub fn text(self) -> &'static str {
        match self {
            FetchError::Empty => EMPTY_TEXT,
            FetchError::Exhausted => FAILED_TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchState {
    /// Attempt `attempt` (1-based) is outstanding until `deadline_ms`
    Requesting { attempt: u8, deadline_ms: u64 },
    Ready,
    Failed(FetchError),
}

pub struct PlaylistBrowser {
    entries: PlaylistList,
    cursor: usize,
    fetch: FetchState,
    request_due: bool,
    config: BrowseConfig,
}

impl PlaylistBrowser {
    /// Start browsing; the first listing request is due immediately
    pub fn new(config: BrowseConfig, now_ms: u64) -> Self {
        Self {
            entries: PlaylistList::new(),
            cursor: 0,
            fetch: FetchState::Requesting {
                attempt: 1,
                deadline_ms: now_ms + config.timeout_ms,
            },
            request_due: true,
            config,
        }
    }

    /// True once per attempt, when a listing request should be sent
    pub fn take_request(&mut self) -> bool {
        core::mem::replace(&mut self.request_due, false)
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    pub fn entries(&self) -> &[Playlist] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Expire the outstanding attempt if its deadline passed
    pub fn tick(&mut self, now_ms: u64) {
        if let FetchState::Requesting { deadline_ms, .. } = self.fetch {
            if now_ms >= deadline_ms {
                self.retry(now_ms);
            }
        }
    }

    /// A listing arrived; an empty one is final
    pub fn on_listing(&mut self, listing: PlaylistList) {
        if !matches!(self.fetch, FetchState::Requesting { .. }) {
            warn!("late playlist listing ignored");
            return;
        }
        self.request_due = false;
        if listing.is_empty() {
            info!("player has no playlists");
            self.fetch = FetchState::Failed(FetchError::Empty);
            return;
        }
        info!("{} playlists loaded", listing.len());
        self.entries = listing;
        self.cursor = 0;
        self.fetch = FetchState::Ready;
    }

    /// The listing request failed before its deadline
    pub fn on_fetch_failed(&mut self, now_ms: u64) {
        if matches!(self.fetch, FetchState::Requesting { .. }) {
            self.retry(now_ms);
        }
    }

    fn retry(&mut self, now_ms: u64) {
        let FetchState::Requesting { attempt, .. } = self.fetch else {
            return;
        };
        if attempt >= self.config.attempts {
            warn!("playlist listing failed after {} attempts", attempt);
            self.fetch = FetchState::Failed(FetchError::Exhausted);
            self.request_due = false;
            return;
        }
        warn!("playlist listing attempt {} failed, retrying", attempt);
        self.fetch = FetchState::Requesting {
            attempt: attempt + 1,
            deadline_ms: now_ms + self.config.timeout_ms,
        };
        self.request_due = true;
    }

    /// Move the cursor, clamped to the list
    pub fn scroll(&mut self, delta: i8) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() as i32 - 1;
        self.cursor = (self.cursor as i32 + delta as i32).clamp(0, last) as usize;
    }

    /// The highlighted entry, once a listing is shown
    pub fn selected(&self) -> Option<&Playlist> {
        match self.fetch {
            FetchState::Ready => self.entries.get(self.cursor),
            _ => None,
        }
    }

    pub fn page(&self) -> PlaylistPage<'_> {
        match self.fetch {
            FetchState::Requesting { attempt, .. } => PlaylistPage::Loading { attempt },
            FetchState::Ready => PlaylistPage::List {
                entries: &self.entries,
                cursor: self.cursor,
            },
            FetchState::Failed(error) => PlaylistPage::Error(error.text()),
        }
    }
}
