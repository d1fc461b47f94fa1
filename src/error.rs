//! Error types for the trendbreak library.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for break detection operations.
pub type Result<T> = std::result::Result<T, BreakError>;

/// Errors that can occur while preparing, fetching or analysing a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BreakError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Too few usable samples for the requested segment size.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A regression design was numerically singular.
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Two samples share the same timestamp.
    #[error("duplicate timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    /// The upstream series source failed.
    #[error("source error: {0}")]
    Source(String),
}

impl BreakError {
    /// Whether retrying the operation could change the outcome.
    ///
    /// Only upstream fetch failures qualify; everything else is a
    /// deterministic property of the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BreakError::Source(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn error_messages_are_descriptive() {
        let err = BreakError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = BreakError::InsufficientData { needed: 13, got: 12 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 13, got 12"
        );

        let err = BreakError::InvalidParameter("min_segment_size must be at least 2".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: min_segment_size must be at least 2"
        );

        let err = BreakError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");

        let ts = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
        let err = BreakError::DuplicateTimestamp(ts);
        assert!(err.to_string().starts_with("duplicate timestamp: 2022-03-01"));
    }

    #[test]
    fn only_source_errors_are_retryable() {
        assert!(BreakError::Source("timeout".into()).is_retryable());
        assert!(!BreakError::EmptyData.is_retryable());
        assert!(!BreakError::InsufficientData { needed: 13, got: 4 }.is_retryable());
        assert!(!BreakError::DegenerateFit("singular".into()).is_retryable());
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = BreakError::Source("connection reset".into());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
