//! Mode controller
//!
//! Owns the active [`ModeState`], the single pending timer and the frame
//! schedule. All inputs are method calls carrying the current time; side
//! effects the daemon must carry out (panel power) are queued as
//! [`Effect`]s.
//!
//! Rules, in priority order:
//! 1. Forcing a mode cancels the pending timer and the old renderer.
//! 2. `play` moves to Playback from any mode, browsing included, and
//!    cancels the grace timer.
//! 3. Leaving `play` while in Playback arms the grace timer once; when it
//!    expires with nothing playing the clock comes back.
//! 4. While not browsing, a quiet snapshot arms the next ladder stage if no
//!    timer is pending, and an exit-sleep snapshot cancels the ladder and
//!    wakes the panel.

use heapless::Deque;
use log::{debug, info};
use oledeck_display::{PlaybackView, Snake};
use oledeck_protocol::text::bounded;
use oledeck_protocol::{Footer, Text, TransportStatus};

use crate::browser::PlaylistBrowser;
use crate::config::{BrowseConfig, CoreConfig, FrameCadence, Timings};
use crate::state::mode::{Mode, ModeState};
use crate::state::timer::{FrameSchedule, PendingTimer, TimerKind};

/// Side effect for the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Switch the panel on or off
    Power(bool),
}

pub struct ModeController {
    state: ModeState,
    pending: Option<PendingTimer>,
    frames: Option<FrameSchedule>,
    playing: bool,
    display_on: bool,
    title: Text,
    artist: Text,
    footer: Footer,
    seed: u64,
    effects: Deque<Effect, 4>,
    timings: Timings,
    cadence: FrameCadence,
    browse: BrowseConfig,
}

impl ModeController {
    /// Start on the clock with the panel on
    pub fn new(config: &CoreConfig, now_ms: u64) -> Self {
        let cadence = config.cadence;
        Self {
            state: ModeState::Clock,
            pending: None,
            frames: Some(FrameSchedule::new(Mode::Clock, cadence.clock_ms, now_ms)),
            playing: false,
            display_on: true,
            title: Text::new(),
            artist: Text::new(),
            footer: Footer::new(),
            seed: now_ms ^ 0x9E37_79B9_7F4A_7C15,
            effects: Deque::new(),
            timings: config.timings,
            cadence,
            browse: config.browse,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn pending(&self) -> Option<PendingTimer> {
        self.pending
    }

    /// Mode of the scheduled renderer, if any
    pub fn frame_mode(&self) -> Option<Mode> {
        self.frames.as_ref().map(FrameSchedule::mode)
    }

    pub fn is_browsing(&self) -> bool {
        self.mode() == Mode::PlaylistBrowse
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn browser(&self) -> Option<&PlaylistBrowser> {
        match &self.state {
            ModeState::PlaylistBrowse(browser) => Some(browser),
            _ => None,
        }
    }

    pub fn browser_mut(&mut self) -> Option<&mut PlaylistBrowser> {
        match &mut self.state {
            ModeState::PlaylistBrowse(browser) => Some(browser),
            _ => None,
        }
    }

    pub fn take_effect(&mut self) -> Option<Effect> {
        self.effects.pop_front()
    }

    /// Switch to `mode` unconditionally
    pub fn force_mode(&mut self, mode: Mode, now_ms: u64) {
        debug!("forcing {:?}", mode);
        self.pending = None;
        let next = self.fresh(mode, now_ms);
        self.enter(next, now_ms);
        if mode == Mode::Playback && !self.playing {
            self.arm(TimerKind::Grace, now_ms);
        }
        self.check();
    }

    /// Transport status from the latest snapshot
    pub fn on_status(&mut self, status: TransportStatus, now_ms: u64) {
        self.playing = status.is_playing();

        if self.playing {
            if self.pending.map(|t| t.kind) == Some(TimerKind::Grace) {
                debug!("grace cancelled");
                self.pending = None;
            }
            if self.mode() != Mode::Playback {
                let next = self.fresh(Mode::Playback, now_ms);
                self.enter(next, now_ms);
            }
        } else if self.mode() == Mode::Playback && self.pending.is_none() {
            self.arm(TimerKind::Grace, now_ms);
        }
        self.check();
    }

    /// Exit-sleep flag from the latest snapshot
    pub fn on_sleep_signal(&mut self, exit_sleep: bool, now_ms: u64) {
        if self.is_browsing() {
            return;
        }

        if !exit_sleep {
            if self.pending.is_none() {
                match self.mode() {
                    Mode::Clock => self.arm(TimerKind::ToClock, now_ms),
                    Mode::Screensaver => self.arm(TimerKind::ToDeepSleep, now_ms),
                    _ => {}
                }
            }
            self.check();
            return;
        }

        if self.pending.is_some_and(|t| t.kind.is_ladder()) {
            debug!("idle ladder reset");
            self.pending = None;
        }
        if self.playing && self.mode() != Mode::Playback {
            let next = self.fresh(Mode::Playback, now_ms);
            self.enter(next, now_ms);
        } else if !self.playing && matches!(self.mode(), Mode::Screensaver | Mode::DeepSleep) {
            self.enter(ModeState::Clock, now_ms);
        }
        if !self.display_on {
            self.power(true);
        }
        self.check();
    }

    /// Fire the pending timer if it is due; returns what fired
    pub fn tick(&mut self, now_ms: u64) -> Option<TimerKind> {
        let timer = self.pending.filter(|t| t.due(now_ms))?;
        self.pending = None;
        debug!("{:?} timer fired", timer.kind);

        match timer.kind {
            TimerKind::Grace => {
                if !self.playing && self.mode() == Mode::Playback {
                    self.enter(ModeState::Clock, now_ms);
                }
            }
            TimerKind::ToClock => {
                if !self.playing {
                    if self.mode() != Mode::Clock {
                        self.enter(ModeState::Clock, now_ms);
                    }
                    self.arm(TimerKind::ToScreensaver, now_ms);
                }
            }
            TimerKind::ToScreensaver => {
                let next = self.fresh(Mode::Screensaver, now_ms);
                self.enter(next, now_ms);
                self.arm(TimerKind::ToDeepSleep, now_ms);
            }
            TimerKind::ToDeepSleep => self.enter(ModeState::DeepSleep, now_ms),
        }
        self.check();
        Some(timer.kind)
    }

    /// Advance the active mode by one frame if its renderer is due
    ///
    /// Returns the mode to draw.
    pub fn poll_frame(&mut self, now_ms: u64) -> Option<Mode> {
        let frames = self.frames.as_mut()?;
        if !frames.poll(now_ms) {
            return None;
        }
        debug_assert_eq!(frames.mode(), self.state.mode());
        self.state.advance();
        Some(self.state.mode())
    }

    /// Open the playlist browser; false if already browsing
    pub fn enter_browse(&mut self, now_ms: u64) -> bool {
        if self.is_browsing() {
            return false;
        }
        self.pending = None;
        let next = self.fresh(Mode::PlaylistBrowse, now_ms);
        self.enter(next, now_ms);
        self.check();
        true
    }

    /// Leave the browser without playing anything
    pub fn leave_browse(&mut self, now_ms: u64) {
        if !self.is_browsing() {
            return;
        }
        let next = if self.playing {
            self.fresh(Mode::Playback, now_ms)
        } else {
            ModeState::Clock
        };
        self.enter(next, now_ms);
        self.check();
    }

    /// A playlist was chosen; show Playback while it starts
    ///
    /// If nothing is playing after the grace period the clock comes back.
    pub fn after_select(&mut self, now_ms: u64) {
        self.force_mode(Mode::Playback, now_ms);
    }

    pub fn set_track(&mut self, title: &str, artist: &str) {
        self.title = bounded(title);
        self.artist = bounded(artist);
        if let ModeState::Playback(view) = &mut self.state {
            view.set_track(title, artist);
        }
    }

    pub fn set_footer(&mut self, footer: &str) {
        self.footer = bounded(footer);
        if let ModeState::Playback(view) = &mut self.state {
            view.set_footer(footer);
        }
    }

    /// Cancel everything and switch the panel off
    pub fn shutdown(&mut self) {
        info!("mode controller shutting down");
        self.pending = None;
        self.frames = None;
        self.state = ModeState::DeepSleep;
        if self.display_on {
            self.power(false);
        }
    }

    fn fresh(&mut self, mode: Mode, now_ms: u64) -> ModeState {
        match mode {
            Mode::Clock => ModeState::Clock,
            Mode::Playback => {
                ModeState::Playback(PlaybackView::new(&self.title, &self.artist, &self.footer))
            }
            Mode::Screensaver => {
                self.seed = self
                    .seed
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ModeState::Screensaver(Snake::new(self.seed))
            }
            Mode::DeepSleep => ModeState::DeepSleep,
            Mode::PlaylistBrowse => {
                ModeState::PlaylistBrowse(PlaylistBrowser::new(self.browse, now_ms))
            }
        }
    }

    fn enter(&mut self, next: ModeState, now_ms: u64) {
        let from = self.state.mode();
        let to = next.mode();

        // old renderer stops before the new state exists
        self.frames = None;
        if self.pending.is_some_and(|t| !t.kind.valid_in(to)) {
            self.pending = None;
        }
        if from == Mode::DeepSleep && to != Mode::DeepSleep {
            self.power(true);
        }

        self.state = next;
        if to == Mode::DeepSleep {
            self.power(false);
        }
        self.frames = self
            .state
            .frame_period(&self.cadence)
            .map(|period| FrameSchedule::new(to, period, now_ms));

        info!("mode {:?} -> {:?}", from, to);
    }

    fn arm(&mut self, kind: TimerKind, now_ms: u64) {
        let delay = match kind {
            TimerKind::Grace => self.timings.grace_ms,
            TimerKind::ToClock => self.timings.to_clock_ms,
            TimerKind::ToScreensaver => self.timings.to_screensaver_ms,
            TimerKind::ToDeepSleep => self.timings.to_deep_sleep_ms,
        };
        debug!("{:?} timer armed for {}ms", kind, delay);
        self.pending = Some(PendingTimer::new(kind, now_ms, delay));
    }

    fn power(&mut self, on: bool) {
        if self.display_on == on {
            return;
        }
        self.display_on = on;
        if self.effects.push_back(Effect::Power(on)).is_err() {
            // only the latest power state matters
            self.effects.clear();
            let _ = self.effects.push_back(Effect::Power(on));
        }
    }

    fn check(&self) {
        debug_assert_eq!(
            self.frames.as_ref().map(FrameSchedule::mode),
            self.state.frame_period(&self.cadence).map(|_| self.state.mode()),
            "renderer scheduled for a mode that is not active"
        );
        debug_assert!(
            self.pending.map_or(true, |t| t.kind.valid_in(self.state.mode())),
            "{:?} timer pending in {:?}",
            self.pending,
            self.state.mode()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use TransportStatus::{Pause, Play, Stop};

    fn controller() -> ModeController {
        ModeController::new(&CoreConfig::default(), 0)
    }

    fn ladder_config() -> CoreConfig {
        CoreConfig {
            timings: Timings {
                to_clock_ms: 6_000,
                to_screensaver_ms: 600_000,
                to_deep_sleep_ms: 600_000,
                grace_ms: 60_000,
            },
            ..Default::default()
        }
    }

    /// Feed one quiet snapshot per second from `from` to `to`
    fn idle(ctrl: &mut ModeController, from: u64, to: u64) {
        let mut now = from;
        while now <= to {
            ctrl.on_status(Stop, now);
            ctrl.on_sleep_signal(false, now);
            ctrl.tick(now);
            now += 1_000;
        }
    }

    #[test]
    fn test_starts_on_clock() {
        let ctrl = controller();
        assert_eq!(ctrl.mode(), Mode::Clock);
        assert_eq!(ctrl.frame_mode(), Some(Mode::Clock));
        assert!(ctrl.display_on());
    }

    #[test]
    fn test_play_forces_playback() {
        let mut ctrl = controller();
        ctrl.on_status(Play, 100);
        assert_eq!(ctrl.mode(), Mode::Playback);
        assert_eq!(ctrl.frame_mode(), Some(Mode::Playback));
        assert!(ctrl.pending().is_none());
    }

    #[test]
    fn test_grace_period() {
        let mut ctrl = controller();
        ctrl.on_status(Play, 0);
        ctrl.on_status(Pause, 0);
        assert_eq!(ctrl.pending().map(|t| t.kind), Some(TimerKind::Grace));

        ctrl.on_status(Pause, 59_000);
        assert_eq!(ctrl.tick(59_000), None);
        assert_eq!(ctrl.mode(), Mode::Playback);

        assert_eq!(ctrl.tick(60_000), Some(TimerKind::Grace));
        assert_eq!(ctrl.mode(), Mode::Clock);
    }

    #[test]
    fn test_grace_not_rearmed_by_repeated_pause() {
        let mut ctrl = controller();
        ctrl.on_status(Play, 0);
        ctrl.on_status(Pause, 0);
        ctrl.on_status(Pause, 30_000);
        assert_eq!(ctrl.pending().map(|t| t.deadline_ms), Some(60_000));
    }

    #[test]
    fn test_play_cancels_grace() {
        let mut ctrl = controller();
        ctrl.on_status(Play, 0);
        ctrl.on_status(Pause, 0);
        ctrl.on_status(Play, 30_000);
        assert!(ctrl.pending().is_none());
        assert_eq!(ctrl.tick(60_000), None);
        assert_eq!(ctrl.mode(), Mode::Playback);
    }

    #[test]
    fn test_idle_ladder() {
        let mut ctrl = ModeController::new(&ladder_config(), 0);
        idle(&mut ctrl, 0, 5_000);
        assert_eq!(ctrl.mode(), Mode::Clock);
        assert_eq!(ctrl.pending().map(|t| t.kind), Some(TimerKind::ToClock));

        idle(&mut ctrl, 6_000, 6_000);
        assert_eq!(ctrl.pending().map(|t| t.kind), Some(TimerKind::ToScreensaver));

        idle(&mut ctrl, 7_000, 605_000);
        assert_eq!(ctrl.mode(), Mode::Clock);
        idle(&mut ctrl, 606_000, 606_000);
        assert_eq!(ctrl.mode(), Mode::Screensaver);
        assert_eq!(ctrl.frame_mode(), Some(Mode::Screensaver));

        idle(&mut ctrl, 607_000, 1_205_000);
        assert_eq!(ctrl.mode(), Mode::Screensaver);
        idle(&mut ctrl, 1_206_000, 1_206_000);
        assert_eq!(ctrl.mode(), Mode::DeepSleep);
        assert_eq!(ctrl.frame_mode(), None);
        assert!(!ctrl.display_on());
        assert_eq!(ctrl.take_effect(), Some(Effect::Power(false)));
    }

    #[test]
    fn test_exit_sleep_resets_ladder() {
        let mut ctrl = ModeController::new(&ladder_config(), 0);
        idle(&mut ctrl, 0, 606_000);
        assert_eq!(ctrl.mode(), Mode::Screensaver);

        ctrl.on_sleep_signal(true, 606_500);
        assert_eq!(ctrl.mode(), Mode::Clock);
        assert!(ctrl.pending().is_none());

        // the ladder starts over from the beginning
        idle(&mut ctrl, 607_000, 607_000);
        assert_eq!(
            ctrl.pending(),
            Some(PendingTimer {
                kind: TimerKind::ToClock,
                deadline_ms: 613_000
            })
        );
    }

    #[test]
    fn test_wake_from_deep_sleep() {
        let mut ctrl = ModeController::new(&ladder_config(), 0);
        idle(&mut ctrl, 0, 1_206_000);
        assert_eq!(ctrl.take_effect(), Some(Effect::Power(false)));

        ctrl.on_status(Play, 1_300_000);
        assert_eq!(ctrl.mode(), Mode::Playback);
        assert!(ctrl.display_on());
        assert_eq!(ctrl.take_effect(), Some(Effect::Power(true)));
        assert_eq!(ctrl.take_effect(), None);
    }

    #[test]
    fn test_browse_suspends_ladder() {
        let mut ctrl = controller();
        ctrl.on_sleep_signal(false, 0);
        assert!(ctrl.pending().is_some());

        assert!(ctrl.enter_browse(1_000));
        assert!(!ctrl.enter_browse(1_000));
        assert!(ctrl.pending().is_none());
        assert!(ctrl.browser().is_some());

        ctrl.on_sleep_signal(false, 2_000);
        ctrl.on_sleep_signal(true, 3_000);
        assert!(ctrl.pending().is_none());
        assert_eq!(ctrl.tick(1_000_000), None);
        assert_eq!(ctrl.mode(), Mode::PlaylistBrowse);
    }

    #[test]
    fn test_play_leaves_browse() {
        let mut ctrl = controller();
        ctrl.enter_browse(0);
        ctrl.on_status(Play, 500);
        assert_eq!(ctrl.mode(), Mode::Playback);
        assert!(ctrl.browser().is_none());
    }

    #[test]
    fn test_select_arms_grace_until_play() {
        let mut ctrl = controller();
        ctrl.enter_browse(0);
        ctrl.after_select(1_000);
        assert_eq!(ctrl.mode(), Mode::Playback);
        assert_eq!(ctrl.pending().map(|t| t.kind), Some(TimerKind::Grace));

        ctrl.on_status(Play, 2_000);
        assert!(ctrl.pending().is_none());
    }

    #[test]
    fn test_select_falls_back_to_clock() {
        let mut ctrl = controller();
        ctrl.enter_browse(0);
        ctrl.after_select(1_000);
        ctrl.tick(61_000);
        assert_eq!(ctrl.mode(), Mode::Clock);
    }

    #[test]
    fn test_leave_browse() {
        let mut ctrl = controller();
        ctrl.enter_browse(0);
        ctrl.leave_browse(10);
        assert_eq!(ctrl.mode(), Mode::Clock);
    }

    #[test]
    fn test_force_mode_cancels_timer() {
        let mut ctrl = controller();
        ctrl.on_sleep_signal(false, 0);
        ctrl.force_mode(Mode::Screensaver, 10);
        assert_eq!(ctrl.mode(), Mode::Screensaver);
        assert!(ctrl.pending().is_none());
        assert_eq!(ctrl.frame_mode(), Some(Mode::Screensaver));
    }

    #[test]
    fn test_track_reaches_playback_view() {
        let mut ctrl = controller();
        ctrl.set_track("Blue in Green", "Miles Davis");
        ctrl.set_footer("flac 44.1kHz");
        ctrl.on_status(Play, 0);
        match ctrl.state() {
            ModeState::Playback(view) => assert_eq!(view.footer(), "flac 44.1kHz"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_poll_frame_follows_cadence() {
        let mut ctrl = controller();
        assert_eq!(ctrl.poll_frame(0), Some(Mode::Clock));
        assert_eq!(ctrl.poll_frame(500), None);
        ctrl.on_status(Play, 600);
        assert_eq!(ctrl.poll_frame(600), Some(Mode::Playback));
        assert_eq!(ctrl.poll_frame(620), None);
        assert_eq!(ctrl.poll_frame(640), Some(Mode::Playback));
    }

    #[test]
    fn test_shutdown_powers_off() {
        let mut ctrl = controller();
        ctrl.on_sleep_signal(false, 0);
        ctrl.shutdown();
        assert!(ctrl.pending().is_none());
        assert_eq!(ctrl.frame_mode(), None);
        assert_eq!(ctrl.take_effect(), Some(Effect::Power(false)));
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Status(u8),
        Sleep(bool),
        Browse,
        Leave,
        Select,
        Wait(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u8..3).prop_map(Step::Status),
            any::<bool>().prop_map(Step::Sleep),
            Just(Step::Browse),
            Just(Step::Leave),
            Just(Step::Select),
            (0u64..200_000).prop_map(Step::Wait),
        ]
    }

    proptest! {
        #[test]
        fn prop_one_mode_one_renderer(steps in prop::collection::vec(step(), 1..80)) {
            let mut ctrl = controller();
            let mut now = 0;
            for step in steps {
                match step {
                    Step::Status(0) => ctrl.on_status(Play, now),
                    Step::Status(1) => ctrl.on_status(Pause, now),
                    Step::Status(_) => ctrl.on_status(Stop, now),
                    Step::Sleep(exit) => ctrl.on_sleep_signal(exit, now),
                    Step::Browse => {
                        // the encoder only opens the browser while idle
                        if !ctrl.is_playing() {
                            ctrl.enter_browse(now);
                        }
                    }
                    Step::Leave => ctrl.leave_browse(now),
                    Step::Select => {
                        if ctrl.is_browsing() {
                            ctrl.after_select(now);
                        }
                    }
                    Step::Wait(dt) => {
                        now += dt;
                        ctrl.tick(now);
                    }
                }

                let mode = ctrl.mode();
                prop_assert_eq!(ctrl.frame_mode().is_some(), mode != Mode::DeepSleep);
                if let Some(frame_mode) = ctrl.frame_mode() {
                    prop_assert_eq!(frame_mode, mode);
                }
                if let Some(timer) = ctrl.pending() {
                    prop_assert!(timer.kind.valid_in(mode));
                }
                prop_assert_eq!(ctrl.display_on(), mode != Mode::DeepSleep);
                if ctrl.is_playing() {
                    prop_assert_eq!(mode, Mode::Playback);
                }
            }
        }
    }
}
