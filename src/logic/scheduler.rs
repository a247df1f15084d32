//! Loop scheduling and deferred timers.
//!
//! The simulation is driven one step per frame by whoever owns the
//! [`LoopScheduler`]. Stopping flips a shared cancellation flag so the next
//! scheduled step becomes a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Explicit start/stop/tick scheduler for the animation loop.
#[derive(Debug)]
pub struct LoopScheduler {
    token: CancelToken,
    running: bool,
    frames: u64,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            running: false,
            frames: 0,
        }
    }

    /// Starts scheduling with a fresh cancellation token.
    ///
    /// Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.running && !self.token.is_cancelled() {
            return false;
        }
        self.token = CancelToken::new();
        self.running = true;
        self.frames = 0;
        true
    }

    /// Cancels the next scheduled step.
    pub fn stop(&mut self) {
        self.token.cancel();
        self.running = false;
    }

    /// Claims the next frame. Returns `false` once stopped or cancelled.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.token.is_cancelled()
    }

    /// Token that other threads can use to stop the loop.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LoopScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot deadlines checked from the tick, cancellable as a group.
#[derive(Debug, Clone, Default)]
pub struct DeferredTimers {
    deadlines: Vec<f64>,
}

impl DeferredTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64) {
        self.deadlines.push(due);
    }

    /// Removes and counts every deadline at or before `now`.
    pub fn fire_due(&mut self, now: f64) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|&due| due > now);
        before - self.deadlines.len()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }
}
