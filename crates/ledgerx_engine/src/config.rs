//! Configuration for the ledger engine.

use std::time::Duration;

/// Configuration for a [`crate::LedgerEngine`] instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Opaque identifier of the originating device, stamped onto every
    /// entry created by `add`.
    pub device_id: String,
    /// Maximum number of entries per sync batch.
    pub batch_size: usize,
    /// Timeout applied to every remote call; exceeding it is treated as a
    /// network failure.
    pub request_timeout: Duration,
    /// Delay before the background sync scheduled by `add` fires.
    pub sync_delay: Duration,
    /// Retry policy for failed batches.
    pub retry: RetryPolicy,
}

impl EngineConfig {
    /// Creates a configuration with the given device id and defaults for
    /// everything else.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            batch_size: 20,
            request_timeout: Duration::from_secs(15),
            sync_delay: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the background sync delay.
    #[must_use]
    pub fn with_sync_delay(mut self, delay: Duration) -> Self {
        self.sync_delay = delay;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// A standalone retry policy: bounded attempts with exponential backoff.
///
/// The delay after the n-th failed attempt is `base_delay * 2^(n-1)`, capped
/// at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per batch (including the first).
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt bound and default delays.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Creates a policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Returns the delay to wait after `failures` failed attempts.
    ///
    /// `failures` is 1-indexed: the delay after the first failure is
    /// `base_delay`, doubling per subsequent failure up to `max_delay`.
    /// `failures == 0` yields no delay.
    #[must_use]
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exp = failures.saturating_sub(1).min(32);
        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(exp));
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
