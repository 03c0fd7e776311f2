//! oledeck - Volumio front panel daemon
//!
//! Drives a 256x64 SSD1322 OLED, an MCP23017 button matrix with LEDs and a
//! rotary encoder on a Raspberry Pi running Volumio. All panel logic lives
//! in `oledeck-core`; this binary opens the devices, starts the worker
//! threads and runs the Embassy tasks that connect them.

use std::time::Duration;

use embassy_executor::Spawner;
use embassy_sync::channel::TrySendError;
use embassy_sync::mutex::Mutex;
use env_logger::Env;
use log::{debug, error, info, warn};
use oledeck_core::App;
use oledeck_hal_linux::GpioChip;
use static_cell::StaticCell;

use crate::channels::{COMMAND_DONE, PLAYER_REPLIES};
use crate::config::Config;
use crate::error::DaemonError;
use crate::presenter::Presenter;
use crate::signals::SignalHandler;
use crate::tasks::{ExecContext, Ports, SharedExpander};
use crate::volumio::{Reply, VolumioClient};

mod board;
mod channels;
mod config;
mod error;
mod presenter;
mod signals;
mod tasks;
mod volumio;

// Shared by the button task and the exec task
static EXPANDER: StaticCell<SharedExpander> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("oledeck {} starting", env!("CARGO_PKG_VERSION"));

    let config = config::load_or_default(&config::config_path());

    if let Err(e) = start(spawner, config) {
        error!("startup failed: {}", e);
        std::process::exit(1);
    }

    info!("All tasks spawned, panel running");
}

fn start(spawner: Spawner, config: Config) -> Result<(), DaemonError> {
    let signals = SignalHandler::new();

    // Display first, so a wiring problem shows before anything else runs
    let mut chip = GpioChip::open(&config.display.gpio_chip)?;
    let presenter = Presenter::spawn(board::open_panel(&mut chip, &config.display)?)?;
    let encoder = board::open_encoder(&mut chip, &config.input)?;
    let expander: &'static SharedExpander =
        EXPANDER.init(Mutex::new(board::open_expander(&config.input)?));

    let timeout = Duration::from_millis(config.player.request_timeout_ms);
    let poller = volumio::spawn_worker(
        "oledeck-poll",
        VolumioClient::new(&config.player.base_url, timeout)?,
        |reply| {
            // every state request must be answered, so wait for room
            if let Err(TrySendError::Full(reply)) = PLAYER_REPLIES.try_send(reply) {
                debug!("reply channel full, waiting");
                embassy_futures::block_on(PLAYER_REPLIES.send(reply));
            }
        },
    )?;
    let commander = volumio::spawn_worker(
        "oledeck-cmd",
        VolumioClient::new(&config.player.base_url, timeout)?,
        |reply| match reply {
            Reply::Command(ok) => COMMAND_DONE.signal(ok),
            other => warn!("unexpected reply on command worker: {:?}", other),
        },
    )?;

    let app = App::new(config.core.clone(), tasks::now_ms());
    let exec = ExecContext {
        expander,
        player: commander,
        service_unit: config.service_unit.clone(),
        command_timeout: embassy_time::Duration::from_millis(
            config.player.request_timeout_ms + 1_000,
        ),
    };
    let ports = Ports {
        player: poller,
        presenter,
        signals,
    };

    spawner.spawn(tasks::buttons_task(expander, config.cadence.button_poll_ms))?;
    spawner.spawn(tasks::encoder_task(
        encoder,
        config.cadence.encoder_poll_ms,
        config.input.press_debounce_ms,
    ))?;
    spawner.spawn(tasks::exec_task(exec))?;
    spawner.spawn(tasks::controller_task(app, ports))?;
    Ok(())
}
