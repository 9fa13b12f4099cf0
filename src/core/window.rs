//! Window selection and rebasing of daily series.
//!
//! Two value conventions flow through the system. Provider data arrives as
//! price levels; the JSON files written by `fetch` and read by `compare` hold
//! percentage performance where `0.0` means "unchanged since the first day".
//! [`select_and_rebase`] needs to know which one it is given, see
//! [`ValueConvention`].
use crate::core::error::SeriesError;
use crate::core::series::{DateWindow, Series};
use chrono::{Months, NaiveDate};
use tracing::debug;

/// How the values of a series should be read when rebasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueConvention {
    /// Percentage performance, `0.0` = no change. Values are mapped onto an
    /// absolute scale (`100 + value`) before taking ratios.
    #[default]
    Percent,
    /// Raw price levels; ratios are taken directly.
    Price,
}

/// Percentage performance over a window, first value `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RebasedSeries {
    pub name: String,
    pub window: DateWindow,
    pub values: Vec<f64>,
}

impl RebasedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Extracts `window` from a contiguous series and rescales it so the value at
/// `window.start` maps to 0% performance while relative growth after it is
/// preserved.
///
/// With [`ValueConvention::Percent`] each day becomes
/// `((100 + v) / (100 + base) - 1) * 100`, with [`ValueConvention::Price`] it
/// becomes `(v / base - 1) * 100`, where `base` is the value at the start.
pub fn select_and_rebase(
    series: &Series,
    window: &DateWindow,
    convention: ValueConvention,
) -> Result<RebasedSeries, SeriesError> {
    series.ensure_covers(window)?;
    // Index arithmetic below relies on one point per day.
    series.validate()?;

    let first_idx = (window.start() - series.first_date()).num_days() as usize;
    let last_idx = (window.stop() - series.first_date()).num_days() as usize;
    let slice = &series.points()[first_idx..=last_idx];

    let offset = match convention {
        ValueConvention::Percent => 100.0,
        ValueConvention::Price => 0.0,
    };
    let base = offset + slice[0].value;
    if base == 0.0 || !base.is_finite() {
        return Err(SeriesError::malformed(
            series.name(),
            format!("cannot rebase on {} at {}", slice[0].value, window.start()),
        ));
    }

    let values = slice
        .iter()
        .map(|p| ((offset + p.value) / base - 1.0) * 100.0)
        .collect();

    Ok(RebasedSeries {
        name: series.name().to_string(),
        window: *window,
        values,
    })
}

/// The range of days covered by every series in the set.
pub fn common_window(series: &[Series]) -> Result<DateWindow, SeriesError> {
    let (first, rest) = series
        .split_first()
        .ok_or(SeriesError::InsufficientSeries { found: 0 })?;
    rest.iter()
        .try_fold(first.date_range(), |window, s| window.intersect(&s.date_range()))
}

/// The window of the last `months` calendar months ending at `stop`.
///
/// Day-of-month is clamped at month ends, so 31 March minus one month is
/// 29 February in a leap year.
pub fn trailing_months(stop: NaiveDate, months: u32) -> Result<DateWindow, SeriesError> {
    let start = stop
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    DateWindow::new(start, stop)
}

/// Re-expresses price levels as percentage performance since the first point.
pub fn to_percentage(series: &Series) -> Result<Series, SeriesError> {
    let base = series.first().value;
    if base == 0.0 || !base.is_finite() {
        return Err(SeriesError::malformed(
            series.name(),
            format!("first price {base} cannot be used as a base"),
        ));
    }
    debug!("{}: rebasing {} prices on {base}", series.name(), series.len());
    Ok(series.map_values(series.currency(), |p| (p.value / base - 1.0) * 100.0))
}
