//! Frame composition
//!
//! Draws the active mode into any Gray4 target. Which mode is drawn comes
//! from the controller only, so a frame can never show a mode that is not
//! active.

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use oledeck_display::{ClockFace, ClockTime, SeekBar};
use oledeck_protocol::PlayerSnapshot;

use crate::app::App;
use crate::state::ModeState;

/// How the presenter should push a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Present {
    /// Rewrite the whole panel
    Full,
    /// Only rows that differ from the last frame
    Partial,
}

/// Draw the active mode; `time` is the wall clock for the clock face
pub fn draw_frame<D>(app: &App, time: ClockTime, target: &mut D) -> Result<Present, D::Error>
where
    D: DrawTarget<Color = Gray4>,
{
    let state = app.controller().state();
    match state {
        ModeState::Clock => ClockFace::draw(time, target)?,
        ModeState::Playback(view) => {
            let empty = PlayerSnapshot::default();
            let snapshot = app.reducer().current().unwrap_or(&empty);
            let seek = app.reducer().seek();
            let bar = SeekBar {
                label: seek.label(),
                ratio: seek.ratio(),
            };
            view.draw(snapshot, bar, target)?;
        }
        ModeState::Screensaver(snake) => snake.draw(target)?,
        ModeState::DeepSleep => target.clear(Gray4::BLACK)?,
        ModeState::PlaylistBrowse(browser) => browser.page().draw(target)?,
    }

    Ok(if state.full_present() {
        Present::Full
    } else {
        Present::Partial
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::input::InputEvent;
    use crate::state::Mode;
    use oledeck_display::Framebuffer;
    use oledeck_protocol::text::bounded;
    use oledeck_protocol::TransportStatus;

    fn playing_app() -> App {
        let mut app = App::new(CoreConfig::default(), 0);
        app.tick(0);
        let snapshot = PlayerSnapshot {
            title: bounded("Title"),
            artist: bounded("Artist"),
            status: TransportStatus::Play,
            volume: Some(50),
            seek_ms: Some(10_000),
            duration_s: Some(100.0),
            ..Default::default()
        };
        app.on_state(snapshot, 10);
        app
    }

    #[test]
    fn test_clock_is_full_present() {
        let app = App::new(CoreConfig::default(), 0);
        let mut fb = Framebuffer::new();
        let present = draw_frame(&app, ClockTime::new(12, 34), &mut fb).unwrap();
        assert_eq!(present, Present::Full);
        assert!(fb.lit_pixels() > 0);
    }

    #[test]
    fn test_playback_is_partial() {
        let mut app = playing_app();
        assert_eq!(app.poll_frame(10), Some(Mode::Playback));
        let mut fb = Framebuffer::new();
        let present = draw_frame(&app, ClockTime::new(0, 0), &mut fb).unwrap();
        assert_eq!(present, Present::Partial);
        assert!(fb.lit_pixels() > 0);
    }

    #[test]
    fn test_browser_loading_page() {
        let mut app = App::new(CoreConfig::default(), 0);
        app.on_input(InputEvent::Press, 0);
        let mut fb = Framebuffer::new();
        let present = draw_frame(&app, ClockTime::new(0, 0), &mut fb).unwrap();
        assert_eq!(present, Present::Full);
        assert!(fb.lit_pixels() > 0);
    }

    #[test]
    fn test_deep_sleep_is_blank() {
        let mut app = playing_app();
        app.shutdown();
        let mut fb = Framebuffer::new();
        draw_frame(&app, ClockTime::new(0, 0), &mut fb).unwrap();
        assert_eq!(fb.lit_pixels(), 0);
    }
}
