//! Error kinds raised by the series engine.
//!
//! Every variant names the offending series (where there is one) together
//! with the bounds or counts that failed, so the message alone is enough to
//! tell what went wrong with a run.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series '{series}': malformed source data: {reason}")]
    MalformedSourceData { series: String, reason: String },

    #[error("series '{series}': expected {expected} daily points, found {actual}")]
    DayCountMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "series '{series}': requested dates ({start}, {stop}) out of bounds ({first}, {last})"
    )]
    WindowOutOfBounds {
        series: String,
        start: NaiveDate,
        stop: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("series '{series}': no conversion path from {from} to {to}")]
    NoConversionPath {
        series: String,
        from: String,
        to: String,
    },

    #[error(
        "series '{series}': rates cover ({first}, {last}) but ({expected_first}, {expected_last}) is required"
    )]
    DateRangeMismatch {
        series: String,
        expected_first: NaiveDate,
        expected_last: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("only {found} series available, at least 2 required")]
    InsufficientSeries { found: usize },

    #[error("empty date window: start {start} is after stop {stop}")]
    EmptyWindow { start: NaiveDate, stop: NaiveDate },
}

impl SeriesError {
    pub(crate) fn malformed(series: &str, reason: impl Into<String>) -> Self {
        SeriesError::MalformedSourceData {
            series: series.to_string(),
            reason: reason.into(),
        }
    }
}
