//! Polling policy

use std::time::Duration;

/// Tunables for how long and how often a session is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between ticks, no backoff or jitter
    pub interval: Duration,

    /// Consecutive failed fetches after which the session gives up.
    /// `None` (or zero) retries forever.
    pub max_consecutive_errors: Option<u32>,

    /// Wall-clock ceiling measured from the start of the watch, submission
    /// included. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1500);
    pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 10;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the error ceiling; `Some(0)` is treated as no ceiling
    pub fn with_max_consecutive_errors(mut self, max: Option<u32>) -> Self {
        self.max_consecutive_errors = max.filter(|&max| max > 0);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_consecutive_errors: Some(Self::DEFAULT_MAX_CONSECUTIVE_ERRORS),
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }
}
