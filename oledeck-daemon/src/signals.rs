//! SIGTERM/SIGINT handling
//!
//! `signal-hook` sets a flag from the signal handler; the controller task
//! polls it on every tick and runs the shutdown sequence itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::warn;
use signal_hook::consts::{SIGINT, SIGTERM};

#[derive(Clone)]
pub struct SignalHandler {
    shutdown_flag: Arc<AtomicBool>,
}

impl SignalHandler {
    /// Create a handler and register the OS hooks
    ///
    /// Registration failures are logged; the daemon then only stops when
    /// killed.
    pub fn new() -> Self {
        let handler = Self::unregistered();
        for (signal, name) in [(SIGTERM, "SIGTERM"), (SIGINT, "SIGINT")] {
            if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&handler.shutdown_flag)) {
                warn!("failed to register {}: {}", name, e);
            }
        }
        handler
    }

    fn unregistered() -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_visible_to_clones() {
        let handler = SignalHandler::unregistered();
        let observer = handler.clone();
        assert!(!observer.should_shutdown());
        handler.shutdown_flag.store(true, Ordering::Relaxed);
        assert!(observer.should_shutdown());
    }

    #[test]
    fn test_sigterm_sets_flag() {
        let handler = SignalHandler::new();
        signal_hook::low_level::raise(SIGTERM).unwrap();
        assert!(handler.should_shutdown());
    }
}
