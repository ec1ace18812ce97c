//! Bounded retry as a decorator around the source traits.
//!
//! Each attempt carries its own deadline (the wrapped client's timeout);
//! this layer only decides whether and when to try again.

use super::provider::{FetchError, Lookback, OptionChainSource, PriceSeriesSource};
use crate::domain::{IndexSymbol, OptionChainSnapshot, PriceBar};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry schedule: `max_attempts` tries, exponential backoff between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// No retries: one attempt only.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before attempt `attempt` (0-based). Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.base_delay
                .checked_mul(2u32.saturating_pow(attempt - 1))
                .unwrap_or(Duration::MAX)
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Returns the last error when every attempt failed.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            match op() {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(label, attempt = attempt + 1, "fetch succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt + 1 < self.max_attempts => {
                    warn!(label, attempt = attempt + 1, max = self.max_attempts, error = %e, "fetch failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Wraps a source and retries its fetches under a [`RetryPolicy`].
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: OptionChainSource> OptionChainSource for Retrying<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_chain(&self, symbol: IndexSymbol) -> Result<OptionChainSnapshot, FetchError> {
        let label = format!("{}:{symbol}", self.inner.name());
        self.policy.run(&label, || self.inner.fetch_chain(symbol))
    }
}

impl<S: PriceSeriesSource> PriceSeriesSource for Retrying<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_bars(&self, symbol: IndexSymbol, lookback: Lookback) -> Result<Vec<PriceBar>, FetchError> {
        let label = format!("{}:{symbol}", self.inner.name());
        self.policy.run(&label, || self.inner.fetch_bars(symbol, lookback))
    }
}
