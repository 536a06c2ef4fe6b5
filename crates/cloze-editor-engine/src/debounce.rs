use std::time::{Duration, Instant};

/// Trailing-edge coalescer holding at most one pending payload.
///
/// A burst of submissions collapses into a single delivery: the first
/// submission of a burst fixes the deadline, later ones only replace the
/// payload. Time is passed in explicitly so callers (and tests) control
/// the clock.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Queue a payload. Replaces any pending payload without extending the
    /// pending deadline.
    pub fn submit(&mut self, payload: T, now: Instant) {
        match self.pending.as_mut() {
            Some(pending) => pending.payload = payload,
            None => {
                self.pending = Some(Pending {
                    payload,
                    deadline: now + self.delay,
                });
            }
        }
    }

    /// Take the pending payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            return self.pending.take().map(|p| p.payload);
        }
        None
    }

    /// Drop the pending payload without delivering it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
