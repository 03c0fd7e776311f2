//! Front panel application
//!
//! [`App`] is the single owner of the reducer, the mode controller and the
//! dispatcher. The daemon feeds it input edges, decoded player responses
//! and the current time, and drains two queues: [`Outbound`] requests for
//! the player and the execution queue, and [`Effect`]s for the panel.

use heapless::Deque;
use log::{debug, warn};
use oledeck_protocol::{AudioFormat, PlayerCommand, PlayerSnapshot, PlaylistList, TransportStatus};

use crate::config::CoreConfig;
use crate::dispatch::{Action, BrowseAction, DispatchContext, Dispatcher};
use crate::input::InputEvent;
use crate::player::{Ingest, PlayerEvent, StateReducer};
use crate::state::{Effect, Mode, ModeController};

/// LED mask shown while playing
pub const LED_PLAYING: u8 = 0x01;
/// LED mask shown while paused
pub const LED_PAUSED: u8 = 0x02;

/// Work for the execution queue, run strictly one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Player(PlayerCommand),
    /// Write the front panel LED register
    Leds(u8),
    RestartService,
}

/// Something the daemon must send or run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Request a state snapshot
    FetchState,
    /// Request the queue to recover a missing audio format
    FetchQueue,
    /// Request the playlist listing
    FetchPlaylists,
    Exec(Job),
}

const OUTBOX_CAPACITY: usize = 16;

pub struct App {
    reducer: StateReducer,
    controller: ModeController,
    dispatcher: Dispatcher,
    outbox: Deque<Outbound, OUTBOX_CAPACITY>,
}

impl App {
    pub fn new(config: CoreConfig, now_ms: u64) -> Self {
        Self {
            reducer: StateReducer::new(config.poll),
            controller: ModeController::new(&config, now_ms),
            dispatcher: Dispatcher::new(config.buttons),
            outbox: Deque::new(),
        }
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn reducer(&self) -> &StateReducer {
        &self.reducer
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn take_outbound(&mut self) -> Option<Outbound> {
        self.outbox.pop_front()
    }

    pub fn take_effect(&mut self) -> Option<Effect> {
        self.controller.take_effect()
    }

    /// Route one confirmed input edge
    pub fn on_input(&mut self, event: InputEvent, now_ms: u64) {
        let ctx = DispatchContext {
            browsing: self.controller.is_browsing(),
            playing: self.controller.is_playing(),
        };

        match self.dispatcher.route(event, ctx) {
            Action::Player { command, led } => {
                if let Some(mask) = led {
                    self.send(Outbound::Exec(Job::Leds(mask)));
                }
                self.send(Outbound::Exec(Job::Player(command)));
            }
            Action::RestartService { led } => {
                self.send(Outbound::Exec(Job::Leds(led)));
                self.send(Outbound::Exec(Job::RestartService));
            }
            Action::Indicate { led } => self.send(Outbound::Exec(Job::Leds(led))),
            Action::Browse(BrowseAction::Enter) => {
                if self.controller.enter_browse(now_ms) {
                    self.pump_browser();
                }
            }
            Action::Browse(BrowseAction::Scroll(delta)) => {
                if let Some(browser) = self.controller.browser_mut() {
                    browser.scroll(delta);
                }
            }
            Action::Browse(BrowseAction::Select) => self.select(now_ms),
            Action::Ignore => {}
        }
    }

    fn select(&mut self, now_ms: u64) {
        let chosen = self
            .controller
            .browser()
            .and_then(|browser| browser.selected())
            .map(|playlist| playlist.name.clone());

        match chosen {
            Some(name) => {
                debug!("playing playlist {}", name.as_str());
                self.send(Outbound::Exec(Job::Player(PlayerCommand::PlayPlaylist(name))));
                self.controller.after_select(now_ms);
            }
            // error page or still loading: press again to leave
            None => self.controller.leave_browse(now_ms),
        }
    }

    /// A state request succeeded
    pub fn on_state(&mut self, snapshot: PlayerSnapshot, now_ms: u64) {
        match self.reducer.on_snapshot(snapshot, now_ms) {
            Ingest::Seeded => {
                self.sync_track();
                self.sync_footer();
                let status = self.reducer.status();
                self.controller.on_status(status, now_ms);
                self.show_status(status);
                if self.reducer.poll(now_ms) {
                    self.send(Outbound::FetchState);
                }
            }
            Ingest::Reduced(reduction) => {
                for event in reduction.events.iter() {
                    match *event {
                        PlayerEvent::TrackChanged => self.sync_track(),
                        PlayerEvent::FormatChanged => self.sync_footer(),
                        PlayerEvent::StatusChanged(status) => {
                            self.controller.on_status(status, now_ms);
                            self.show_status(status);
                        }
                        PlayerEvent::SeekChanged
                        | PlayerEvent::VolumeChanged
                        | PlayerEvent::PlayModesChanged => {}
                    }
                }
                self.controller.on_sleep_signal(reduction.exit_sleep, now_ms);
            }
        }

        if self.reducer.wants_queue() {
            self.send(Outbound::FetchQueue);
        }
    }

    /// A state request failed or could not be decoded
    pub fn on_state_failed(&mut self) {
        self.reducer.on_request_failed();
    }

    /// Queue lookup answered; `None` when the queue had no format either
    pub fn on_queue(&mut self, format: Option<AudioFormat>) {
        if self.reducer.on_queue_format(format) {
            self.sync_footer();
        }
    }

    pub fn on_playlists(&mut self, listing: PlaylistList) {
        match self.controller.browser_mut() {
            Some(browser) => browser.on_listing(listing),
            None => debug!("playlist listing arrived outside the browser"),
        }
    }

    pub fn on_playlists_failed(&mut self, now_ms: u64) {
        if let Some(browser) = self.controller.browser_mut() {
            browser.on_fetch_failed(now_ms);
        }
        self.pump_browser();
    }

    /// Advance timers and issue due requests
    pub fn tick(&mut self, now_ms: u64) {
        if self.reducer.poll(now_ms) {
            self.send(Outbound::FetchState);
        }
        self.controller.tick(now_ms);
        if let Some(browser) = self.controller.browser_mut() {
            browser.tick(now_ms);
        }
        self.pump_browser();
    }

    /// Step the active mode's animation if a frame is due
    pub fn poll_frame(&mut self, now_ms: u64) -> Option<Mode> {
        self.controller.poll_frame(now_ms)
    }

    /// Switch the panel off and clear the LEDs
    pub fn shutdown(&mut self) {
        self.controller.shutdown();
        self.send(Outbound::Exec(Job::Leds(0)));
    }

    fn pump_browser(&mut self) {
        let due = self
            .controller
            .browser_mut()
            .is_some_and(|browser| browser.take_request());
        if due {
            self.send(Outbound::FetchPlaylists);
        }
    }

    fn sync_track(&mut self) {
        if let Some(current) = self.reducer.current() {
            self.controller.set_track(&current.title, &current.artist);
        }
    }

    fn sync_footer(&mut self) {
        if let Some(current) = self.reducer.current() {
            let footer = current.footer();
            self.controller.set_footer(&footer);
        }
    }

    fn show_status(&mut self, status: TransportStatus) {
        let mask = match status {
            TransportStatus::Play => LED_PLAYING,
            TransportStatus::Pause => LED_PAUSED,
            TransportStatus::Stop => 0,
        };
        self.send(Outbound::Exec(Job::Leds(mask)));
    }

    fn send(&mut self, message: Outbound) {
        if let Err(message) = self.outbox.push_back(message) {
            warn!("outbox full, dropping {:?}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonId, Rotation};
    use oledeck_protocol::text::bounded;
    use oledeck_protocol::Playlist;

    fn snapshot(title: &str, status: TransportStatus) -> PlayerSnapshot {
        PlayerSnapshot {
            title: bounded(title),
            artist: bounded("Artist"),
            status,
            volume: Some(30),
            ..Default::default()
        }
    }

    fn drain(app: &mut App) -> Vec<Outbound> {
        core::iter::from_fn(|| app.take_outbound()).collect()
    }

    fn seeded_app(status: TransportStatus) -> App {
        let mut app = App::new(CoreConfig::default(), 0);
        app.tick(0);
        assert_eq!(drain(&mut app), vec![Outbound::FetchState]);
        app.on_state(snapshot("Song", status), 10);
        drain(&mut app);
        app.on_state(snapshot("Song", status), 20);
        drain(&mut app);
        app
    }

    #[test]
    fn test_seed_requests_again_and_syncs_mode() {
        let mut app = App::new(CoreConfig::default(), 0);
        app.tick(0);
        drain(&mut app);
        app.on_state(snapshot("Song", TransportStatus::Play), 10);
        let out = drain(&mut app);
        assert!(out.contains(&Outbound::FetchState));
        assert!(out.contains(&Outbound::Exec(Job::Leds(LED_PLAYING))));
        assert_eq!(app.mode(), Mode::Playback);
    }

    #[test]
    fn test_late_state_answer_keeps_one_request_outstanding() {
        let mut app = App::new(CoreConfig::default(), 0);
        let count = |out: Vec<Outbound>| out.iter().filter(|m| **m == Outbound::FetchState).count();
        let mut outstanding = 0;

        app.tick(0);
        outstanding += count(drain(&mut app));
        app.tick(5_000);
        app.tick(12_000);
        outstanding += count(drain(&mut app));
        assert_eq!(outstanding, 1);

        // the slow answer seeds and asks again, one at a time
        app.on_state(snapshot("Song", TransportStatus::Play), 12_100);
        outstanding -= 1;
        outstanding += count(drain(&mut app));
        assert_eq!(outstanding, 1);
        app.tick(12_200);
        outstanding += count(drain(&mut app));
        assert_eq!(outstanding, 1);

        app.on_state_failed();
        outstanding -= 1;
        app.tick(13_200);
        outstanding += count(drain(&mut app));
        assert_eq!(outstanding, 1);
    }

    #[test]
    fn test_button_lights_led_then_sends_command() {
        let mut app = seeded_app(TransportStatus::Stop);
        app.on_input(InputEvent::Button(ButtonId::new(4).unwrap()), 30);
        assert_eq!(
            drain(&mut app),
            vec![
                Outbound::Exec(Job::Leds(0x08)),
                Outbound::Exec(Job::Player(PlayerCommand::Next)),
            ]
        );
    }

    #[test]
    fn test_unassigned_button_only_lights_led() {
        let mut app = seeded_app(TransportStatus::Play);
        app.on_input(InputEvent::Button(ButtonId::new(8).unwrap()), 30);
        assert_eq!(drain(&mut app), vec![Outbound::Exec(Job::Leds(0x80))]);
        assert_eq!(app.mode(), Mode::Playback);
    }

    #[test]
    fn test_restart_button() {
        let mut app = seeded_app(TransportStatus::Stop);
        app.on_input(InputEvent::Button(ButtonId::new(6).unwrap()), 30);
        assert_eq!(
            drain(&mut app),
            vec![
                Outbound::Exec(Job::Leds(0x20)),
                Outbound::Exec(Job::RestartService),
            ]
        );
    }

    #[test]
    fn test_rotation_sets_volume_while_playing() {
        let mut app = seeded_app(TransportStatus::Play);
        app.on_input(InputEvent::Rotate(Rotation::Clockwise), 30);
        assert_eq!(
            drain(&mut app),
            vec![Outbound::Exec(Job::Player(PlayerCommand::VolumeUp))]
        );
    }

    #[test]
    fn test_browse_select_plays_playlist() {
        let mut app = seeded_app(TransportStatus::Stop);
        app.on_input(InputEvent::Press, 100);
        assert_eq!(app.mode(), Mode::PlaylistBrowse);
        assert_eq!(drain(&mut app), vec![Outbound::FetchPlaylists]);

        let listing: PlaylistList = ["Jazz", "Rock"]
            .iter()
            .map(|name| Playlist {
                name: bounded(name),
                uri: bounded(name),
            })
            .collect();
        app.on_playlists(listing);
        app.on_input(InputEvent::Rotate(Rotation::Clockwise), 200);
        app.on_input(InputEvent::Press, 300);

        assert_eq!(
            drain(&mut app),
            vec![Outbound::Exec(Job::Player(PlayerCommand::PlayPlaylist(
                bounded("Rock")
            )))]
        );
        assert_eq!(app.mode(), Mode::Playback);
    }

    #[test]
    fn test_browse_retries_then_press_leaves() {
        let mut app = seeded_app(TransportStatus::Stop);
        app.on_input(InputEvent::Press, 0);
        drain(&mut app);

        app.on_playlists_failed(100);
        assert!(drain(&mut app).contains(&Outbound::FetchPlaylists));
        app.tick(5_100);
        assert!(drain(&mut app).contains(&Outbound::FetchPlaylists));
        app.tick(10_100);
        assert!(!drain(&mut app).contains(&Outbound::FetchPlaylists));

        app.on_input(InputEvent::Press, 11_000);
        assert_eq!(app.mode(), Mode::Clock);
    }

    #[test]
    fn test_status_change_updates_leds() {
        let mut app = seeded_app(TransportStatus::Play);
        app.on_state(snapshot("Song", TransportStatus::Pause), 1_000);
        assert!(drain(&mut app).contains(&Outbound::Exec(Job::Leds(LED_PAUSED))));
        assert_eq!(app.mode(), Mode::Playback);
        assert!(app.controller().pending().is_some());
    }

    #[test]
    fn test_queue_fallback_requested_for_formatless_track() {
        let mut app = App::new(CoreConfig::default(), 0);
        app.tick(0);
        drain(&mut app);
        app.on_state(snapshot("Song", TransportStatus::Play), 10);
        assert!(drain(&mut app).contains(&Outbound::FetchQueue));

        app.on_queue(Some(AudioFormat {
            bit_depth: bounded("24 bit"),
            ..Default::default()
        }));
        assert_eq!(
            app.reducer().current().map(|s| s.footer()),
            Some(bounded("24bit"))
        );
    }

    #[test]
    fn test_shutdown_clears_leds() {
        let mut app = seeded_app(TransportStatus::Play);
        app.shutdown();
        assert_eq!(app.take_effect(), Some(Effect::Power(false)));
        assert_eq!(drain(&mut app), vec![Outbound::Exec(Job::Leds(0))]);
    }
}
