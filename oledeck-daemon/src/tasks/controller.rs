//! Main controller task
//!
//! Sole owner of the [`App`]. Waits on input edges, player replies and a
//! fixed tick; after each wakeup it forwards the App's outbound requests
//! and panel effects. Frames are rendered here and handed to the presenter
//! thread, or dropped while the previous one is still being sent.

use chrono::Timelike;
use crossbeam_channel::{Sender, TrySendError};
use embassy_futures::select::{select3, Either3};
use embassy_sync::channel::TrySendError as ChannelFull;
use embassy_time::{with_timeout, Duration, Ticker};
use log::{debug, info, trace, warn};
use oledeck_core::state::Effect;
use oledeck_core::{draw_frame, App, Outbound, Present};
use oledeck_display::{ClockTime, Framebuffer};

use super::now_ms;
use crate::channels::{EXEC_CHANNEL, EXEC_IDLE, INPUT_CHANNEL, PLAYER_REPLIES};
use crate::presenter::Presenter;
use crate::signals::SignalHandler;
use crate::volumio::{Reply, Request};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 10;

/// Longest wait for the exec queue to drain on shutdown
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(2);

/// Everything the controller talks to besides the static channels
pub struct Ports {
    /// State/queue/playlist worker
    pub player: Sender<Request>,
    pub presenter: Presenter,
    pub signals: SignalHandler,
}

#[embassy_executor::task]
pub async fn controller_task(mut app: App, ports: Ports) {
    info!("Controller task started in {:?}", app.mode());

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        match select3(INPUT_CHANNEL.receive(), PLAYER_REPLIES.receive(), ticker.next()).await {
            Either3::First(event) => {
                debug!("Input: {:?}", event);
                app.on_input(event, now_ms());
            }
            Either3::Second(reply) => on_reply(&mut app, reply, now_ms()),
            Either3::Third(()) => {
                let now = now_ms();
                app.tick(now);
                if app.poll_frame(now).is_some() {
                    render(&app, &ports.presenter);
                }
            }
        }

        forward(&mut app, &ports);

        if ports.signals.should_shutdown() {
            break;
        }
    }

    shutdown(app, ports).await;
}

fn on_reply(app: &mut App, reply: Reply, now: u64) {
    match reply {
        Reply::State(Some(snapshot)) => app.on_state(snapshot, now),
        Reply::State(None) => app.on_state_failed(),
        Reply::Queue(format) => app.on_queue(format),
        Reply::Playlists(Some(listing)) => app.on_playlists(listing),
        Reply::Playlists(None) => app.on_playlists_failed(now),
        Reply::Command(ok) => trace!("stray command reply {}", ok),
    }
}

/// Drain the App's outbox and effects
fn forward(app: &mut App, ports: &Ports) {
    while let Some(message) = app.take_outbound() {
        match message {
            Outbound::FetchState => {
                if !request(&ports.player, Request::State) {
                    app.on_state_failed();
                }
            }
            Outbound::FetchQueue => {
                if !request(&ports.player, Request::Queue) {
                    app.on_queue(None);
                }
            }
            Outbound::FetchPlaylists => {
                if !request(&ports.player, Request::Playlists) {
                    app.on_playlists_failed(now_ms());
                }
            }
            Outbound::Exec(job) => {
                if let Err(ChannelFull::Full(job)) = EXEC_CHANNEL.try_send(job) {
                    warn!("exec channel full, dropping {:?}", job);
                }
            }
        }
    }

    while let Some(effect) = app.take_effect() {
        match effect {
            Effect::Power(on) => ports.presenter.set_power(on),
        }
    }
}

fn request(player: &Sender<Request>, request: Request) -> bool {
    match player.try_send(request) {
        Ok(()) => true,
        Err(TrySendError::Full(request)) => {
            warn!("player worker busy, {:?} not sent", request);
            false
        }
        Err(TrySendError::Disconnected(request)) => {
            warn!("player worker gone, {:?} not sent", request);
            false
        }
    }
}

fn render(app: &App, presenter: &Presenter) {
    if !presenter.try_begin() {
        trace!("panel busy, {} frames dropped", presenter.dropped_frames());
        return;
    }
    let mut frame = Box::new(Framebuffer::new());
    let present = match draw_frame(app, wall_clock(), frame.as_mut()) {
        Ok(present) => present,
        Err(never) => match never {},
    };
    presenter.present(frame, present == Present::Full);
}

fn wall_clock() -> ClockTime {
    let now = chrono::Local::now();
    ClockTime::new(now.hour() as u8, now.minute() as u8)
}

/// Clear the LEDs, blank the panel and exit
async fn shutdown(mut app: App, ports: Ports) {
    info!("shutting down");

    EXEC_IDLE.reset();
    app.shutdown();
    forward(&mut app, &ports);
    if with_timeout(SHUTDOWN_DRAIN, EXEC_IDLE.wait()).await.is_err() {
        warn!("exec queue did not drain");
    }

    ports.presenter.shutdown();
    info!("oledeck stopped");
    std::process::exit(0);
}
