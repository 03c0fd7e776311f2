//! Button matrix polling task
//!
//! Scans the MCP23017 matrix every `button_poll_ms` and forwards each
//! released-to-pressed edge to the controller.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};
use log::{debug, info, warn};
use oledeck_core::input::{ButtonMatrix, InputEvent};
use oledeck_drivers::Mcp23017;
use oledeck_hal_linux::LinuxI2c;

use super::send_input;

/// The expander is shared with the exec task, which drives the LEDs
pub type SharedExpander = Mutex<CriticalSectionRawMutex, Mcp23017<LinuxI2c>>;

#[embassy_executor::task]
pub async fn buttons_task(expander: &'static SharedExpander, poll_ms: u64) {
    info!("Button task started, polling every {} ms", poll_ms);

    let mut matrix = ButtonMatrix::new();
    let mut ticker = Ticker::every(Duration::from_millis(poll_ms.max(1)));
    let mut failing = false;

    loop {
        ticker.next().await;

        let scan = expander.lock().await.scan();
        match scan {
            Ok(scan) => {
                if failing {
                    info!("expander scan recovered");
                    failing = false;
                }
                for id in matrix.update(scan) {
                    debug!("button {} pressed", id.get());
                    send_input(InputEvent::Button(id));
                }
            }
            // logged once per outage; the bus is retried on every tick
            Err(e) => {
                if !failing {
                    warn!("expander scan failed: {:?}", e);
                    failing = true;
                }
            }
        }
    }
}
