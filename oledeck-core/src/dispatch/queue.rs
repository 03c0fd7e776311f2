//! Concurrency-1 execution queue
//!
//! Outbound jobs (player commands, LED writes, service restarts) are run
//! strictly one at a time: [`ExecQueue::begin`] hands out the next job only
//! after the previous one was reported through [`ExecQueue::complete`].
//! Failed jobs are logged and dropped, never retried.

use core::fmt::Debug;

use heapless::Deque;
use log::{debug, warn};

/// Returned by [`ExecQueue::push`] when the backlog is full
#[derive(Debug, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

pub struct ExecQueue<T, const N: usize> {
    pending: Deque<T, N>,
    in_flight: bool,
    completed: u32,
    failed: u32,
    dropped: u32,
}

impl<T: Debug, const N: usize> ExecQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            in_flight: false,
            completed: 0,
            failed: 0,
            dropped: 0,
        }
    }

    /// Queue a job behind any pending ones
    pub fn push(&mut self, job: T) -> Result<(), QueueFull<T>> {
        self.pending.push_back(job).map_err(|job| {
            self.dropped += 1;
            warn!("exec queue full, dropping {:?}", job);
            QueueFull(job)
        })
    }

    /// Take the next job, unless one is still running
    pub fn begin(&mut self) -> Option<T> {
        if self.in_flight {
            return None;
        }
        let job = self.pending.pop_front()?;
        self.in_flight = true;
        debug!("exec begin {:?}", job);
        Some(job)
    }

    /// Report the outcome of the job handed out by [`begin`](Self::begin)
    pub fn complete<E: Debug>(&mut self, outcome: Result<(), E>) {
        debug_assert!(self.in_flight, "complete() without a running job");
        self.in_flight = false;
        match outcome {
            Ok(()) => self.completed += 1,
            Err(e) => {
                self.failed += 1;
                warn!("exec job failed: {:?}", e);
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.pending.is_empty()
    }

    /// (completed, failed, dropped) since startup
    pub fn stats(&self) -> (u32, u32, u32) {
        (self.completed, self.failed, self.dropped)
    }
}

impl<T: Debug, const N: usize> Default for ExecQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
