//! Acquisition of the input series from an external aggregation service.
//!
//! The service itself (remote imagery reduced to a mean per composite) lives
//! outside this crate; it is reached through [`SeriesSource`]. Transient
//! failures are retried according to an explicit [`RetryPolicy`].

mod retry;

pub use retry::{fetch_with_retry, RetryPolicy};

use crate::changepoint::{detect_break, BreakConfig, BreakResult};
use crate::core::TimeSeries;
use crate::error::{BreakError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open date range `[start, end)` to aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRequest {
    start: NaiveDate,
    end: NaiveDate,
}

impl SeriesRequest {
    /// Create a request, requiring `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(BreakError::InvalidParameter(format!(
                "request start {} must precede end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Something that can produce a time series for a date range.
///
/// Implementations should report network or service failures as
/// [`BreakError::Source`] so they are eligible for retry.
pub trait SeriesSource {
    fn fetch(&self, request: &SeriesRequest) -> Result<TimeSeries>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    fn fetch(&self, request: &SeriesRequest) -> Result<TimeSeries> {
        (**self).fetch(request)
    }
}

/// Fetch a series (with retries) and run break detection on it.
pub fn detect_from_source<S: SeriesSource + ?Sized>(
    source: &S,
    request: &SeriesRequest,
    policy: &RetryPolicy,
    config: &BreakConfig,
) -> Result<BreakResult> {
    let series = fetch_with_retry(source, request, policy)?;
    detect_break(&series, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    struct FlakySource {
        failures_left: Cell<u32>,
        calls: Cell<u32>,
        values: Vec<f64>,
    }

    impl SeriesSource for FlakySource {
        fn fetch(&self, _request: &SeriesRequest) -> Result<TimeSeries> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(BreakError::Source("reduceRegion timed out".into()));
            }
            TimeSeries::monthly(2018, 1, self.values.clone())
        }
    }

    fn request() -> SeriesRequest {
        SeriesRequest::new(
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        )
        .unwrap()
    }

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .max_attempts(max_attempts)
            .base_delay(Duration::ZERO)
    }

    #[test]
    fn request_requires_ordered_dates() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(SeriesRequest::new(d, d).is_err());
        assert_eq!(request().start(), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn detect_from_source_after_transient_failure() {
        let mut values = vec![25.0; 12];
        values.extend(vec![1.0; 12]);
        let source = FlakySource {
            failures_left: Cell::new(1),
            calls: Cell::new(0),
            values,
        };

        let result =
            detect_from_source(&source, &request(), &instant_policy(2), &BreakConfig::default())
                .unwrap();

        assert_eq!(source.calls.get(), 2);
        assert!(result.has_break);
        assert_eq!(result.break_index(), Some(12));
    }

    #[test]
    fn detect_from_source_propagates_short_series() {
        let source = FlakySource {
            failures_left: Cell::new(0),
            calls: Cell::new(0),
            values: vec![1.0; 5],
        };
        let result =
            detect_from_source(&source, &request(), &instant_policy(2), &BreakConfig::default());
        assert!(matches!(result, Err(BreakError::InsufficientData { .. })));
        assert_eq!(source.calls.get(), 1);
    }
}
