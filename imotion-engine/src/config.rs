//! Polling configuration
//!
//! Defines how often a submitted job is checked, how many checks it gets
//! before it is considered timed out, and how the displayed progress is
//! estimated while the service has not reported completion yet.

use std::time::Duration;

/// Status polling policy
///
/// The progress estimate is a display heuristic only: it grows by
/// `progress_step` per unresolved check and is capped at `progress_cap`
/// until the service reports completion, which jumps it to 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status checks
    pub interval: Duration,

    /// Number of unresolved status checks before giving up
    pub max_attempts: u32,

    /// Progress percentage added per unresolved check
    pub progress_step: u8,

    /// Highest progress shown before the job actually completes
    pub progress_cap: u8,
}

impl PollPolicy {
    /// Creates the default policy: one check per second, 100 checks at most
    pub fn new() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 100,
            progress_step: 3,
            progress_cap: 90,
        }
    }

    /// Overrides the delay between status checks
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Overrides the status check budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Estimated progress after `attempts` unresolved status checks
    pub fn progress_for(&self, attempts: u32) -> u8 {
        let estimate = u64::from(attempts) * u64::from(self.progress_step);
        estimate.min(u64::from(self.progress_cap)) as u8
    }

    /// Worst-case wall time spent polling a single job
    pub fn max_duration(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Validates the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("poll interval must be greater than 0".to_string());
        }

        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }

        if self.progress_cap >= 100 {
            return Err("progress_cap must stay below 100".to_string());
        }

        Ok(())
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new()
    }
}
