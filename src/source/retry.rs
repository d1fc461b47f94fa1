//! Retry policy for series acquisition.

use super::{SeriesRequest, SeriesSource};
use crate::core::TimeSeries;
use crate::error::{BreakError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Capped exponential backoff for transient source failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, the first call included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(64) as i32);
        let secs = self.base_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Fetch a series, retrying retryable errors per `policy`.
///
/// Non-retryable errors are returned immediately. When all attempts fail
/// the last error is returned.
pub fn fetch_with_retry<S: SeriesSource + ?Sized>(
    source: &S,
    request: &SeriesRequest,
    policy: &RetryPolicy,
) -> Result<TimeSeries> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match source.fetch(request) {
            Ok(series) => return Ok(series),
            Err(e) if e.is_retryable() => {
                if attempt + 1 < attempts {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        ?delay,
                        error = %e,
                        "series fetch failed, retrying"
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| BreakError::Source("no fetch attempted".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<u32>,
        error: BreakError,
    }

    impl SeriesSource for CountingSource {
        fn fetch(&self, _request: &SeriesRequest) -> Result<TimeSeries> {
            self.calls.set(self.calls.get() + 1);
            Err(self.error.clone())
        }
    }

    fn request() -> SeriesRequest {
        SeriesRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn delay_grows_and_caps() {
        let policy = RetryPolicy::default()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(350))
            .multiplier(2.0);

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(350));
        assert_eq!(policy.delay_for(1000), Duration::from_millis(350));
    }

    #[test]
    fn builder_clamps_degenerate_values() {
        let policy = RetryPolicy::default().max_attempts(0).multiplier(0.1);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.multiplier, 1.0);
        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let source = CountingSource {
            calls: Cell::new(0),
            error: BreakError::Source("503".into()),
        };
        let policy = RetryPolicy::default()
            .max_attempts(3)
            .base_delay(Duration::ZERO);

        let result = fetch_with_retry(&source, &request(), &policy);

        assert_eq!(result, Err(BreakError::Source("503".into())));
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn non_retryable_errors_fail_fast() {
        let source = CountingSource {
            calls: Cell::new(0),
            error: BreakError::EmptyData,
        };
        let policy = RetryPolicy::default()
            .max_attempts(5)
            .base_delay(Duration::ZERO);

        let result = fetch_with_retry(&source, &request(), &policy);

        assert_eq!(result, Err(BreakError::EmptyData));
        assert_eq!(source.calls.get(), 1);
    }
}
