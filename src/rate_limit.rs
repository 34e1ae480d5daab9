//! # Rate-Limit Coordinator
//!
//! Wraps hosting-service calls in a [`RetryPolicy`]. When a call is rejected
//! by a primary or secondary rate limit, the policy sleeps for the
//! service-specified duration and tries the same request again, up to
//! `max_retries` times.
//!
//! The retry counter lives on the stack of [`RetryPolicy::execute`], so every
//! logical request starts from zero regardless of what earlier requests went
//! through.

use crate::defaults;
use crate::github::{ApiFailure, RateLimitKind};
use std::time::Duration;

/// Blocks the current thread. Swapped out in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How rate-limited requests are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Lower bound for the wait after a secondary rate limit.
    pub min_secondary_retry_after: Duration,
    /// Wait used when the service gives no retry-after.
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            min_secondary_retry_after: Duration::from_secs(defaults::SECONDARY_RETRY_AFTER_SECS),
            default_retry_after: Duration::from_secs(defaults::DEFAULT_RETRY_AFTER_SECS),
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after a rate limit of `kind`.
    pub fn retry_delay(&self, kind: RateLimitKind, retry_after: Option<u64>) -> Duration {
        let requested = retry_after
            .map(Duration::from_secs)
            .unwrap_or(self.default_retry_after);
        match kind {
            RateLimitKind::Primary => requested,
            RateLimitKind::Secondary => requested.max(self.min_secondary_retry_after),
        }
    }

    /// Total attempts made before giving up on a rate-limited request.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `call`, retrying while it is rate limited.
    ///
    /// Returns the first non-rate-limit outcome. When the ceiling is reached
    /// the last `RateLimited` failure is returned unchanged.
    pub fn execute<T, F>(
        &self,
        sleeper: &dyn Sleeper,
        description: &str,
        mut call: F,
    ) -> std::result::Result<T, ApiFailure>
    where
        F: FnMut() -> std::result::Result<T, ApiFailure>,
    {
        let mut retries = 0u32;
        loop {
            match call() {
                Err(ApiFailure::RateLimited { kind, retry_after })
                    if retries < self.max_retries =>
                {
                    let delay = self.retry_delay(kind, retry_after);
                    match kind {
                        RateLimitKind::Primary => log::warn!(
                            "Request quota exhausted for request {}. Retrying after {} seconds! ({}/{})",
                            description,
                            delay.as_secs(),
                            retries + 1,
                            self.max_retries
                        ),
                        RateLimitKind::Secondary => log::warn!(
                            "Secondary rate limit hit for {}. Retrying after {} seconds! ({}/{})",
                            description,
                            delay.as_secs(),
                            retries + 1,
                            self.max_retries
                        ),
                    }
                    sleeper.sleep(delay);
                    retries += 1;
                }
                Err(failure @ ApiFailure::RateLimited { .. }) => {
                    log::error!(
                        "Giving up on {} after {} attempts: still rate limited",
                        description,
                        self.max_attempts()
                    );
                    return Err(failure);
                }
                other => return other,
            }
        }
    }
}
