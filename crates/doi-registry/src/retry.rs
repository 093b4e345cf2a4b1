//! Bounded retry with exponential backoff.
//!
//! Only the paginated listing retries. Writes are never retried: a create
//! that failed in an unknown way may already have minted a DOI.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, waiting 2s then 4s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping.
    #[must_use]
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after the given failed attempt (1-based): `base * 2^attempt`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds or attempts run out, returning the
    /// last error in the latter case.
    pub fn run<T, E, F>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= self.max_attempts.max(1) => return Err(error),
                Err(error) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        target_url = %label,
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        %error,
                        "request failed, retrying"
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
            }
        }
    }
}
