//! Startup errors
//!
//! Only startup can fail the daemon. Once the tasks run, every failure is
//! logged where it happens and the loop carries on.

use std::io;

use embassy_executor::SpawnError;
use oledeck_display::DisplayError;
use oledeck_drivers::ExpanderError;
use oledeck_hal_linux::HalError;
use thiserror::Error;

use crate::volumio::ClientError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Hal(#[from] HalError),

    #[error("panel: {0:?}")]
    Panel(DisplayError),

    #[error("expander: {0:?}")]
    Expander(ExpanderError<HalError>),

    #[error("player client: {0}")]
    Client(#[from] ClientError),

    #[error("cannot start thread {name}: {source}")]
    Thread {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot spawn task: {0:?}")]
    Spawn(SpawnError),
}

impl From<DisplayError> for DaemonError {
    fn from(e: DisplayError) -> Self {
        DaemonError::Panel(e)
    }
}

impl From<ExpanderError<HalError>> for DaemonError {
    fn from(e: ExpanderError<HalError>) -> Self {
        DaemonError::Expander(e)
    }
}

impl From<SpawnError> for DaemonError {
    fn from(e: SpawnError) -> Self {
        DaemonError::Spawn(e)
    }
}
