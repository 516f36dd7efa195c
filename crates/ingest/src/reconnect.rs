//! Exponential backoff between MQTT poll failures.
//!
//! After a connection is lost, rumqttc reconnects on the next `poll()`.
//! [`Backoff`] paces those polls so an unreachable broker is not hammered.

use std::time::Duration;

/// Wait after the first failed poll.
pub const INITIAL_WAIT: Duration = Duration::from_secs(1);

/// Longest wait between polls while the broker stays unreachable.
pub const MAX_WAIT: Duration = Duration::from_secs(30);

/// Doubling wait sequence, capped at `max`, restarted by [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial.min(max),
        }
    }

    /// Delay to wait after the latest failure; advances the sequence.
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        wait
    }

    /// Start over from the initial delay once the broker answers again.
    pub fn reset(&mut self) {
        self.current = self.initial.min(self.max);
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_WAIT, MAX_WAIT)
    }
}
