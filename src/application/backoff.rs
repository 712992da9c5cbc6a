//! Inter-window backoff.

use std::time::Duration;

use crate::utils::jitter::jittered;

/// Delay between batch windows.
///
/// With `adaptive` set, a window that saw rate limiting doubles the base
/// delay for the next pause (up to `max`), and a clean window resets it.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base: Duration,
    jitter: Duration,
    max: Duration,
    adaptive: bool,
    current: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, jitter: Duration, max: Duration, adaptive: bool) -> Self {
        let base = base.min(max);
        Self {
            base,
            jitter,
            max,
            adaptive,
            current: base,
        }
    }

    /// Base delay the next pause will be jittered around.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Advances the policy after a window and returns the pause to take.
    pub fn next_delay(&mut self, rate_limited: bool) -> Duration {
        if self.adaptive {
            if rate_limited {
                let escalated = self.current.saturating_mul(2).min(self.max);
                if escalated > self.current {
                    tracing::warn!(
                        backoff_ms = escalated.as_millis() as u64,
                        "Rate limited, increasing inter-batch backoff"
                    );
                }
                self.current = escalated;
            } else {
                self.current = self.base;
            }
        }

        jittered(self.current, self.jitter).min(self.max)
    }
}
