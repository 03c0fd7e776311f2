//! Exec task
//!
//! Runs outbound jobs strictly one at a time: player commands (through the
//! command worker thread), LED writes and the service restart. Jobs that
//! arrive while one runs wait in the [`ExecQueue`]; failures are logged
//! and dropped.

use std::io;
use std::process::{Command, ExitStatus};

use crossbeam_channel::Sender;
use embassy_time::{with_timeout, Delay, Duration};
use log::{debug, info, warn};
use oledeck_core::dispatch::ExecQueue;
use oledeck_core::Job;
use oledeck_drivers::{set_leds, ExpanderError};
use oledeck_hal_linux::HalError;
use thiserror::Error;

use super::SharedExpander;
use crate::channels::{COMMAND_DONE, EXEC_CHANNEL, EXEC_IDLE};
use crate::volumio::Request;

/// Jobs held while one runs
const EXEC_BACKLOG: usize = 16;

pub struct ExecContext {
    pub expander: &'static SharedExpander,
    /// Command worker
    pub player: Sender<Request>,
    pub service_unit: String,
    /// How long to wait for the command worker's answer
    pub command_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command worker busy or gone")]
    WorkerUnavailable,

    #[error("player rejected the command")]
    Rejected,

    #[error("player command timed out")]
    Timeout,

    #[error("LED write: {0:?}")]
    Leds(ExpanderError<HalError>),

    #[error("cannot run systemctl: {0}")]
    Spawn(#[from] io::Error),

    #[error("systemctl exited with {0}")]
    Restart(ExitStatus),
}

#[embassy_executor::task]
pub async fn exec_task(ctx: ExecContext) {
    info!("Exec task started");

    let mut queue: ExecQueue<Job, EXEC_BACKLOG> = ExecQueue::new();

    loop {
        let job = EXEC_CHANNEL.receive().await;
        // a full queue logs and counts the drop itself
        let _ = queue.push(job);

        loop {
            while let Ok(job) = EXEC_CHANNEL.try_receive() {
                let _ = queue.push(job);
            }
            let Some(job) = queue.begin() else {
                break;
            };
            let outcome = run(&ctx, job).await;
            queue.complete(outcome);
        }

        let (completed, failed, dropped) = queue.stats();
        debug!(
            "exec idle: {} completed, {} failed, {} dropped",
            completed, failed, dropped
        );
        EXEC_IDLE.signal(());
    }
}

async fn run(ctx: &ExecContext, job: Job) -> Result<(), ExecError> {
    match job {
        Job::Player(command) => {
            COMMAND_DONE.reset();
            ctx.player
                .try_send(Request::Command(command))
                .map_err(|_| ExecError::WorkerUnavailable)?;
            match with_timeout(ctx.command_timeout, COMMAND_DONE.wait()).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(ExecError::Rejected),
                Err(_) => Err(ExecError::Timeout),
            }
        }
        Job::Leds(mask) => set_leds(ctx.expander, mask, &mut Delay)
            .await
            .map_err(ExecError::Leds),
        Job::RestartService => restart(&ctx.service_unit),
    }
}

/// Queue a restart of `unit` without waiting for it; restarting our own
/// unit stops this process through SIGTERM
fn restart(unit: &str) -> Result<(), ExecError> {
    info!("restarting {}", unit);
    let status = Command::new("systemctl")
        .args(["--no-block", "restart", unit])
        .status()?;
    if status.success() {
        Ok(())
    } else {
        warn!("systemctl restart {} failed", unit);
        Err(ExecError::Restart(status))
    }
}
