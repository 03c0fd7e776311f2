//! Rotary encoder polling task
//!
//! Samples CLK, DT and the push switch every `encoder_poll_ms`. Rotation
//! is decoded on CLK changes; presses are falling edges of SW outside the
//! debounce window.

use embassy_time::{Duration, Ticker};
use log::{debug, info, warn};
use oledeck_core::input::{InputEvent, PressSwitch, QuadratureDecoder};
use oledeck_hal::InputPin;
use oledeck_hal_linux::{HalError, LinuxInput};

use super::{now_ms, send_input};

pub struct EncoderLines {
    pub clk: LinuxInput,
    pub dt: LinuxInput,
    pub sw: LinuxInput,
}

impl EncoderLines {
    /// Raw levels of (CLK, DT, SW)
    fn sample(&mut self) -> Result<(bool, bool, bool), HalError> {
        Ok((self.clk.is_high()?, self.dt.is_high()?, self.sw.is_high()?))
    }
}

#[embassy_executor::task]
pub async fn encoder_task(mut lines: EncoderLines, poll_ms: u64, press_debounce_ms: u64) {
    info!("Encoder task started, polling every {} ms", poll_ms);

    // idle lines rest high
    let (clk, _, sw) = lines.sample().unwrap_or_else(|e| {
        warn!("encoder lines unreadable at startup: {}", e);
        (true, true, true)
    });
    let mut decoder = QuadratureDecoder::new(clk);
    let mut switch = PressSwitch::new(sw, press_debounce_ms);
    let mut ticker = Ticker::every(Duration::from_millis(poll_ms.max(1)));
    let mut failing = false;

    loop {
        ticker.next().await;

        let (clk, dt, sw) = match lines.sample() {
            Ok(levels) => {
                failing = false;
                levels
            }
            Err(e) => {
                if !failing {
                    warn!("encoder read failed: {}", e);
                    failing = true;
                }
                continue;
            }
        };

        if let Some(rotation) = decoder.sample(clk, dt) {
            debug!("encoder {:?}", rotation);
            send_input(InputEvent::Rotate(rotation));
        }
        if switch.sample(sw, now_ms()) {
            debug!("encoder pressed");
            send_input(InputEvent::Press);
        }
    }
}
