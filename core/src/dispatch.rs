//! Where completion callbacks run.
//!
//! # Design
//! The executor never calls a callback directly. It hands a `Job` to a
//! `Dispatcher`, which decides which thread runs it. `Inline` runs jobs on
//! the background worker itself. `ForegroundLane` is an event-loop analog
//! owned by the caller: the worker posts jobs through a `ForegroundHandle`
//! and the owning thread runs them when it pumps the lane. Jobs posted to a
//! lane run in the order they were posted.

use std::time::{Duration, Instant};

use crossbeam::channel;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs every job immediately on the dispatching thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Dispatcher for Inline {
    fn dispatch(&self, job: Job) {
        job()
    }
}

/// A queue of callbacks drained by the thread that owns it.
pub struct ForegroundLane {
    sender: channel::Sender<Job>,
    receiver: channel::Receiver<Job>,
}

impl ForegroundLane {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self { sender, receiver }
    }

    /// A dispatcher that posts onto this lane.
    pub fn handle(&self) -> ForegroundHandle {
        ForegroundHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run every job already posted, without waiting. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job and run it.
    pub fn run_one(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(_) => false,
        }
    }

    /// Keep running jobs as they arrive until `duration` has passed.
    pub fn run_for(&self, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut ran = 0;
        while let Ok(job) = self.receiver.recv_deadline(deadline) {
            job();
            ran += 1;
        }
        ran
    }
}

impl Default for ForegroundLane {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable posting side of a `ForegroundLane`.
#[derive(Clone)]
pub struct ForegroundHandle {
    sender: channel::Sender<Job>,
}

impl Dispatcher for ForegroundHandle {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            tracing::warn!("foreground lane is gone, dropping callback");
        }
    }
}
