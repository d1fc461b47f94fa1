//! Core data structures for break detection.

mod time_series;

pub use time_series::TimeSeries;
