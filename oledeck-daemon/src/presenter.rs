//! Panel presenter thread
//!
//! SPI transfers of a full frame take tens of milliseconds, so the panel
//! lives on its own thread. The controller claims [`FRAME_GATE`] before
//! rendering; the presenter releases it once the frame is on the glass.
//! Power changes travel on the same channel so they stay ordered with
//! the frames around them.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_hal::spi::SpiDevice;
use log::{debug, info, warn};
use oledeck_display::{FrameGate, Framebuffer, PixelDriver};
use oledeck_drivers::Ssd1322;
use oledeck_hal::OutputPin;

use crate::error::DaemonError;

/// One frame in flight plus a few power changes
const PANEL_CHANNEL_CAP: usize = 4;

/// Claimed by the renderer, released by the presenter
pub static FRAME_GATE: FrameGate = FrameGate::new();

pub enum PanelCommand {
    Frame { frame: Box<Framebuffer>, full: bool },
    Power(bool),
    /// Blank, switch off and stop the thread
    Shutdown,
}

/// A panel that accepts frames rendered off-thread
pub trait Panel: PixelDriver {
    fn load(&mut self, frame: &Framebuffer);
}

impl<SPI, DC, RST> Panel for Ssd1322<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn load(&mut self, frame: &Framebuffer) {
        Ssd1322::load(self, frame);
    }
}

pub struct Presenter {
    tx: Sender<PanelCommand>,
    gate: &'static FrameGate,
    worker: Option<JoinHandle<()>>,
}

impl Presenter {
    pub fn spawn<P: Panel + Send + 'static>(panel: P) -> Result<Self, DaemonError> {
        Self::spawn_with_gate(panel, &FRAME_GATE)
    }

    fn spawn_with_gate<P: Panel + Send + 'static>(
        panel: P,
        gate: &'static FrameGate,
    ) -> Result<Self, DaemonError> {
        let (tx, rx) = bounded(PANEL_CHANNEL_CAP);
        let worker = thread::Builder::new()
            .name("oledeck-panel".into())
            .spawn(move || run(panel, &rx, gate))
            .map_err(|source| DaemonError::Thread {
                name: "oledeck-panel".into(),
                source,
            })?;
        info!("panel presenter started");
        Ok(Self {
            tx,
            gate,
            worker: Some(worker),
        })
    }

    /// Claim the panel for one frame; `false` means drop this frame
    pub fn try_begin(&self) -> bool {
        self.gate.try_begin()
    }

    /// Hand over a frame claimed with [`try_begin`](Self::try_begin)
    pub fn present(&self, frame: Box<Framebuffer>, full: bool) {
        if let Err(e) = self.tx.try_send(PanelCommand::Frame { frame, full }) {
            warn!("panel channel {}, frame lost", describe(&e));
            self.gate.finish();
        }
    }

    pub fn set_power(&self, on: bool) {
        if let Err(e) = self.tx.try_send(PanelCommand::Power(on)) {
            warn!("panel channel {}, power {} lost", describe(&e), on);
        }
    }

    pub fn dropped_frames(&self) -> u32 {
        self.gate.dropped()
    }

    /// Blank the panel and wait for the thread to finish
    pub fn shutdown(mut self) {
        if self.tx.send(PanelCommand::Shutdown).is_err() {
            warn!("panel thread already gone");
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("panel thread panicked");
            }
        }
    }
}

fn describe<T>(e: &TrySendError<T>) -> &'static str {
    match e {
        TrySendError::Full(_) => "full",
        TrySendError::Disconnected(_) => "closed",
    }
}

fn run<P: Panel>(mut panel: P, rx: &Receiver<PanelCommand>, gate: &FrameGate) {
    for command in rx.iter() {
        match command {
            PanelCommand::Frame { frame, full } => {
                panel.load(&frame);
                if let Err(e) = panel.present(full) {
                    warn!("present failed: {:?}", e);
                }
                gate.finish();
            }
            PanelCommand::Power(on) => {
                debug!("panel power {}", if on { "on" } else { "off" });
                if let Err(e) = panel.set_power(on) {
                    warn!("panel power change failed: {:?}", e);
                }
            }
            PanelCommand::Shutdown => {
                let _ = panel.clear(Gray4::BLACK);
                if let Err(e) = panel.present(true).and_then(|()| panel.set_power(false)) {
                    warn!("panel shutdown failed: {:?}", e);
                }
                info!("panel off");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oledeck_display::{DisplayError, PANEL_HEIGHT, PANEL_WIDTH};
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Present { full: bool, lit: usize },
        Power(bool),
    }

    struct FakePanel {
        frame: Framebuffer,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl OriginDimensions for FakePanel {
        fn size(&self) -> Size {
            Size::new(PANEL_WIDTH, PANEL_HEIGHT)
        }
    }

    impl DrawTarget for FakePanel {
        type Color = Gray4;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
        where
            I: IntoIterator<Item = Pixel<Gray4>>,
        {
            self.frame.draw_iter(pixels)
        }
    }

    impl PixelDriver for FakePanel {
        fn present(&mut self, full: bool) -> Result<(), DisplayError> {
            let lit = self.frame.lit_pixels();
            self.calls.lock().unwrap().push(Call::Present { full, lit });
            Ok(())
        }

        fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
            self.calls.lock().unwrap().push(Call::Power(on));
            Ok(())
        }

        fn set_contrast(&mut self, _level: u8) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    impl Panel for FakePanel {
        fn load(&mut self, frame: &Framebuffer) {
            self.frame.copy_from(frame);
        }
    }

    fn fake() -> (FakePanel, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let panel = FakePanel {
            frame: Framebuffer::new(),
            calls: calls.clone(),
        };
        (panel, calls)
    }

    fn lit_frame() -> Box<Framebuffer> {
        let mut frame = Box::new(Framebuffer::new());
        Pixel(Point::new(3, 3), Gray4::WHITE)
            .draw(frame.as_mut())
            .unwrap();
        frame
    }

    #[test]
    fn test_frame_presented_and_gate_released() {
        static GATE: FrameGate = FrameGate::new();
        let (panel, calls) = fake();
        let presenter = Presenter::spawn_with_gate(panel, &GATE).unwrap();

        assert!(presenter.try_begin());
        presenter.present(lit_frame(), false);
        presenter.set_power(false);
        presenter.shutdown();

        assert!(!GATE.is_busy());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Present { full: false, lit: 1 },
                Call::Power(false),
                Call::Present { full: true, lit: 0 },
                Call::Power(false),
            ]
        );
    }

    #[test]
    fn test_busy_gate_drops_frame() {
        static GATE: FrameGate = FrameGate::new();
        let (panel, calls) = fake();
        let presenter = Presenter::spawn_with_gate(panel, &GATE).unwrap();

        assert!(GATE.try_begin());
        assert!(!presenter.try_begin());
        assert_eq!(presenter.dropped_frames(), 1);
        GATE.finish();

        presenter.shutdown();
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Present { full: true, lit: 0 }, Call::Power(false)]
        );
    }
}
