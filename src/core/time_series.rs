//! TimeSeries data structure for representing sampled radiance aggregates.

use crate::error::{BreakError, Result};
use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A univariate time series with strictly increasing timestamps.
///
/// Construction drops missing (non-finite) values and sorts the remaining
/// samples by timestamp, so every `TimeSeries` satisfies:
/// - all values are finite
/// - timestamps are strictly increasing
///
/// Deserialization goes through the same checks as [`TimeSeries::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    dropped: usize,
}

/// Unchecked wire form of a [`TimeSeries`].
#[derive(Deserialize)]
struct RawSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    #[serde(default)]
    dropped: usize,
}

impl TryFrom<RawSeries> for TimeSeries {
    type Error = BreakError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        let mut series = TimeSeries::new(raw.timestamps, raw.values)?;
        series.dropped += raw.dropped;
        Ok(series)
    }
}

impl TimeSeries {
    /// Create a series from parallel timestamp and value vectors.
    ///
    /// Non-finite values are treated as missing and dropped. Samples are
    /// sorted by timestamp; two samples sharing a timestamp are rejected.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(BreakError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        Self::from_samples(timestamps.into_iter().zip(values))
    }

    /// Create a series from `(timestamp, value)` samples in any order.
    pub fn from_samples<I>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let mut dropped = 0;
        let mut kept: Vec<(DateTime<Utc>, f64)> = samples
            .into_iter()
            .filter(|(_, v)| {
                let ok = v.is_finite();
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();

        // Stable, so the reported duplicate is the first one encountered.
        kept.sort_by_key(|(ts, _)| *ts);

        if let Some(pair) = kept.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(BreakError::DuplicateTimestamp(pair[1].0));
        }

        let (timestamps, values) = kept.into_iter().unzip();
        Ok(Self {
            timestamps,
            values,
            dropped,
        })
    }

    /// Create a monthly series starting on the first day of `year`-`month`.
    ///
    /// Mirrors how monthly composites are stamped: one sample per calendar
    /// month at midnight UTC.
    pub fn monthly(year: i32, month: u32, values: Vec<f64>) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            BreakError::InvalidParameter(format!("invalid start month {}-{}", year, month))
        })?;

        let mut timestamps = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            let date = start
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| BreakError::InvalidParameter("month range overflow".into()))?;
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| BreakError::InvalidParameter("invalid midnight".into()))?;
            timestamps.push(Utc.from_utc_datetime(&midnight));
        }

        Self::new(timestamps, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of samples dropped as missing during construction.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the timestamp at an index.
    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(index).copied()
    }

    /// Get the value at an index.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Iterate over `(timestamp, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Extract the samples in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end || end > self.len() {
            return Err(BreakError::InvalidParameter(format!(
                "invalid slice [{}, {}) for series of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            dropped: 0,
        })
    }

    /// Keep only samples with `start <= timestamp < end`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeSeries {
        let lo = self.timestamps.partition_point(|ts| *ts < start);
        let hi = self.timestamps.partition_point(|ts| *ts < end).max(lo);
        TimeSeries {
            timestamps: self.timestamps[lo..hi].to_vec(),
            values: self.values[lo..hi].to_vec(),
            dropped: 0,
        }
    }
}
