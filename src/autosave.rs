//! Save debouncing.
//!
//! Every mutation asks for a save; the save happens once the state has been
//! quiet for `delay`. A new request pushes the deadline back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a save `delay` after `now`, replacing any pending one.
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            Some(_) | None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
