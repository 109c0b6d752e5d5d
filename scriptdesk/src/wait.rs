use crate::errors::AutomationError;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// A bounded retry loop: probe, sleep one interval, repeat until the probe
/// yields a value or the timeout runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Probes at least once, even with a zero timeout. The last sleep is cut
    /// short at the deadline, so the loop overshoots the timeout by at most
    /// one probe. Probe errors end the wait immediately.
    pub fn poll<T>(
        &self,
        condition: impl std::fmt::Display,
        mut probe: impl FnMut() -> Result<Option<T>, AutomationError>,
    ) -> Result<T, AutomationError> {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(value) = probe()? {
                debug!(attempts, elapsed = ?start.elapsed(), "{condition}: satisfied");
                return Ok(value);
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                debug!(attempts, ?elapsed, "{condition}: timed out");
                return Err(AutomationError::Timeout {
                    condition: condition.to_string(),
                    elapsed,
                });
            }
            thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}
